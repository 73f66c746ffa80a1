//! Station configuration
//!
//! Plain integer fields so the whole struct can be written by hand in a
//! JSON file; the scheduler reads it through the `*_interval()`-style
//! accessors, which return [`MillisDurationU32`].
//!
//! ```rust
//! use meteo_core::config::StationConfig;
//!
//! let config = StationConfig::default().with_sensor_check_s(60);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.sensor_check_interval().to_millis(), 60_000);
//! ```

use fugit::MillisDurationU32;

use crate::civil_time::DstRule;
use crate::constants::display::{
    BLINK_INTERVAL_MS, CLOCK_DWELL_S, COMFORT_PRESSURE_MMHG, FORECAST_DWELL_S, FORECAST_INTERVAL_S,
    PRESSURE_TOLERANCE_MMHG, READING_DWELL_S,
};
use crate::constants::time::{MS_PER_SECOND, SECONDS_PER_WEEK};
use crate::detector::ChangeThresholds;
use crate::errors::{StationError, StationResult};

/// Runtime-tunable station parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StationConfig {
    /// Seconds between sensor-change checks
    pub sensor_check_s: u32,
    /// Seconds between network time resyncs
    pub ntp_resync_s: u32,
    /// Blink half-period of the severe alert LED
    pub blink_ms: u32,
    /// Dwell of each reading screen
    pub reading_dwell_s: u32,
    /// Dwell of the forecast screen
    pub forecast_dwell_s: u32,
    /// Seconds between forecast fetches
    pub forecast_interval_s: u32,
    /// Dwell of the clock face
    pub clock_dwell_s: u32,
    /// Pause between ticks
    pub tick_pause_s: u32,
    /// Pause after a tick that recorded a failure
    pub fault_backoff_s: u32,
    /// Link connection attempts at startup
    pub network_attempts: u32,
    /// Delay between startup connection attempts
    pub network_retry_delay_s: u32,
    /// Center of the comfortable pressure band (mmHg)
    pub comfort_pressure_mmhg: i32,
    /// Half-width of the comfortable pressure band (mmHg)
    pub pressure_tolerance_mmhg: i32,
    pub thresholds: ChangeThresholds,
    pub dst: DstRule,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            sensor_check_s: 300,
            ntp_resync_s: SECONDS_PER_WEEK,
            blink_ms: BLINK_INTERVAL_MS,
            reading_dwell_s: READING_DWELL_S,
            forecast_dwell_s: FORECAST_DWELL_S,
            forecast_interval_s: FORECAST_INTERVAL_S,
            clock_dwell_s: CLOCK_DWELL_S,
            tick_pause_s: 1,
            fault_backoff_s: 5,
            network_attempts: 3,
            network_retry_delay_s: 5,
            comfort_pressure_mmhg: COMFORT_PRESSURE_MMHG,
            pressure_tolerance_mmhg: PRESSURE_TOLERANCE_MMHG,
            thresholds: ChangeThresholds::default(),
            dst: DstRule::default(),
        }
    }
}

const fn seconds(s: u32) -> MillisDurationU32 {
    MillisDurationU32::from_ticks(s.saturating_mul(MS_PER_SECOND))
}

impl StationConfig {
    pub fn with_sensor_check_s(mut self, s: u32) -> Self {
        self.sensor_check_s = s;
        self
    }

    pub fn with_ntp_resync_s(mut self, s: u32) -> Self {
        self.ntp_resync_s = s;
        self
    }

    pub fn with_blink_ms(mut self, ms: u32) -> Self {
        self.blink_ms = ms;
        self
    }

    pub fn with_forecast_interval_s(mut self, s: u32) -> Self {
        self.forecast_interval_s = s;
        self
    }

    /// Set all three screen dwells at once
    pub fn with_dwells_s(mut self, reading: u32, forecast: u32, clock: u32) -> Self {
        self.reading_dwell_s = reading;
        self.forecast_dwell_s = forecast;
        self.clock_dwell_s = clock;
        self
    }

    pub fn with_pacing_s(mut self, tick_pause: u32, fault_backoff: u32) -> Self {
        self.tick_pause_s = tick_pause;
        self.fault_backoff_s = fault_backoff;
        self
    }

    pub fn with_network_retries(mut self, attempts: u32, delay_s: u32) -> Self {
        self.network_attempts = attempts;
        self.network_retry_delay_s = delay_s;
        self
    }

    pub fn with_comfort_band(mut self, center_mmhg: i32, tolerance_mmhg: i32) -> Self {
        self.comfort_pressure_mmhg = center_mmhg;
        self.pressure_tolerance_mmhg = tolerance_mmhg;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ChangeThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_dst_rule(mut self, dst: DstRule) -> Self {
        self.dst = dst;
        self
    }

    /// Reject values the scheduler can't run with
    ///
    /// Intervals must be non-zero so a task can't fire on every tick by
    /// accident; dwells and pauses may be zero (useful in tests).
    pub fn validate(&self) -> StationResult<()> {
        let intervals = [
            (self.sensor_check_s, "sensor check interval is zero"),
            (self.ntp_resync_s, "NTP resync interval is zero"),
            (self.blink_ms, "blink interval is zero"),
            (self.forecast_interval_s, "forecast interval is zero"),
        ];
        for (value, reason) in intervals {
            if value == 0 {
                return Err(StationError::InvalidConfig { reason });
            }
        }

        if self.pressure_tolerance_mmhg < 0 {
            return Err(StationError::InvalidConfig {
                reason: "pressure tolerance is negative",
            });
        }

        for tier in [
            self.thresholds.inside_temperature,
            self.thresholds.humidity,
            self.thresholds.pressure,
        ] {
            if !(tier.moderate >= 0.0 && tier.severe >= tier.moderate) {
                return Err(StationError::InvalidConfig {
                    reason: "severe threshold below moderate",
                });
            }
        }

        if !(1..=12).contains(&self.dst.start_month)
            || !(1..=12).contains(&self.dst.end_month)
            || self.dst.start_hour_utc > 23
            || self.dst.end_hour_utc > 23
        {
            return Err(StationError::InvalidConfig {
                reason: "DST rule out of range",
            });
        }

        Ok(())
    }

    pub const fn sensor_check_interval(&self) -> MillisDurationU32 {
        seconds(self.sensor_check_s)
    }

    pub const fn ntp_resync_interval(&self) -> MillisDurationU32 {
        seconds(self.ntp_resync_s)
    }

    pub const fn blink_interval(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.blink_ms)
    }

    pub const fn forecast_interval(&self) -> MillisDurationU32 {
        seconds(self.forecast_interval_s)
    }

    pub const fn reading_dwell(&self) -> MillisDurationU32 {
        seconds(self.reading_dwell_s)
    }

    pub const fn forecast_dwell(&self) -> MillisDurationU32 {
        seconds(self.forecast_dwell_s)
    }

    pub const fn clock_dwell(&self) -> MillisDurationU32 {
        seconds(self.clock_dwell_s)
    }

    pub const fn tick_pause(&self) -> MillisDurationU32 {
        seconds(self.tick_pause_s)
    }

    pub const fn fault_backoff(&self) -> MillisDurationU32 {
        seconds(self.fault_backoff_s)
    }

    pub const fn network_retry_delay(&self) -> MillisDurationU32 {
        seconds(self.network_retry_delay_s)
    }

    /// True when the pressure lies inside the comfortable band (inclusive)
    pub fn pressure_is_comfortable(&self, mmhg: f32) -> bool {
        let low = (self.comfort_pressure_mmhg - self.pressure_tolerance_mmhg) as f32;
        let high = (self.comfort_pressure_mmhg + self.pressure_tolerance_mmhg) as f32;
        mmhg >= low && mmhg <= high
    }
}
