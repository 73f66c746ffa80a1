//! Observation and time fixtures

use chrono::NaiveDate;

use meteo_core::civil_time::{LocalTime, UnixSeconds};
use meteo_core::observation::{Metric, Observation, RawValue};

/// Observation with every sensor present
pub fn reading(outside: f32, inside: f32, humidity: f32, pressure: f32) -> Observation {
    Observation::new()
        .with(Metric::OutsideTemperature, outside)
        .with(Metric::InsideTemperature, inside)
        .with(Metric::Humidity, humidity)
        .with(Metric::Pressure, pressure)
}

/// The baseline used throughout: 20 °C inside, 40 %, 750 mmHg
pub fn calm() -> Observation {
    reading(10.0, 20.0, 40.0, 750.0)
}

/// Same readings as the sensor drivers format them
pub fn calm_as_text() -> Observation {
    Observation {
        outside_temp: RawValue::text("10C"),
        inside_temp: RawValue::text("20C"),
        humidity: RawValue::text("40%"),
        pressure: RawValue::text("750"),
    }
}

/// Indoor temperature up by `delta`
pub fn warmer(delta: f32) -> Observation {
    reading(10.0, 20.0 + delta, 40.0, 750.0)
}

/// Humidity sensor silent
pub fn without_humidity() -> Observation {
    let mut observation = calm();
    observation.humidity = None;
    observation
}

pub fn noon() -> LocalTime {
    LocalTime::new(2025, 6, 1, 12, 0, 0).expect("valid date")
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> UnixSeconds {
    NaiveDate::from_ymd_opt(y, mo, d)
        .and_then(|date| date.and_hms_opt(h, mi, s))
        .expect("valid timestamp")
        .and_utc()
        .timestamp()
}
