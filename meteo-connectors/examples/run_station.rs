//! Run the Station on a Desktop Host
//!
//! Wires the core loop to the host adapters and never returns:
//!
//! - network time from an SNTP server
//! - a JSON file standing in for the battery-backed RTC
//! - screens rendered as log lines
//! - a simulated barometer and thermometers drifting slowly
//! - tomorrow's forecast from Open-Meteo, with the `http` feature
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run -p meteo-connectors --example run_station
//! cargo run -p meteo-connectors --example run_station --features http -- station.json
//! ```
//!
//! The optional argument is a station config file; fields left out keep
//! their defaults. `METEO_NTP` overrides the time server, `METEO_RTC` the
//! clock file, and `RUST_LOG` the log filter.

use std::env;
use std::error::Error;
use std::path::PathBuf;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

use meteo_connectors::sntp::DEFAULT_SERVER;
use meteo_connectors::{load_config, FileClock, HostLink, LogPresenter, SntpClient};
use meteo_core::civil_time::{CivilClock, LocalTime};
use meteo_core::observation::{station_pressure_mmhg, Metric, Observation};
use meteo_core::scheduler::Scheduler;
use meteo_core::time::{StdDelay, SystemTime};
use meteo_core::traits::{ObservationSource, PersistentClock};
use meteo_core::{StationConfig, StationError, StationResult};

/// Bench sensors: a slow sine drift, one step per read
#[derive(Default)]
struct DriftingSensors {
    step: u32,
}

impl ObservationSource for DriftingSensors {
    fn read(&mut self) -> StationResult<Observation> {
        let phase = self.step as f32 / 40.0;
        self.step = self.step.wrapping_add(1);

        let hpa = 1008.0 + 9.0 * phase.sin();
        let pressure = station_pressure_mmhg(hpa).ok_or(StationError::SensorUnavailable {
            sensor: "barometer",
        })?;

        Ok(Observation::new()
            .with(Metric::OutsideTemperature, 6.0 + 4.0 * (phase * 0.5).cos())
            .with(Metric::InsideTemperature, 21.5 + 3.5 * phase.sin())
            .with(Metric::Humidity, 45.0 + 8.0 * phase.cos())
            .with(Metric::Pressure, pressure as f32))
    }
}

fn init_logging() -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging().map_err(|e| e.to_string())?;

    let config = match env::args().nth(1) {
        Some(path) => load_config(path)?,
        None => StationConfig::default(),
    };

    let rtc_path = env::var("METEO_RTC")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("meteo-rtc.json"));
    let mut rtc = FileClock::new(&rtc_path);
    if rtc.read().is_err() {
        // a fresh RTC starts at its epoch until the first sync
        rtc.write(&LocalTime::new(2025, 1, 1, 0, 0, 0)?)?;
    }

    let server = env::var("METEO_NTP").unwrap_or_else(|_| DEFAULT_SERVER.to_string());
    let clock = CivilClock::new(Box::new(SntpClient::new(server)), Box::new(rtc));

    let builder = Scheduler::builder(SystemTime::new(), StdDelay, DriftingSensors::default(), clock)
        .config(config)
        .presenter(LogPresenter::new())
        .network(HostLink);

    #[cfg(feature = "http")]
    let builder = {
        use meteo_connectors::{OpenMeteoClient, OpenMeteoConfig};
        // Lviv
        builder.forecast(OpenMeteoClient::new(OpenMeteoConfig::new(49.84, 24.03))?)
    };

    let mut station = builder.build()?;
    station.run()
}
