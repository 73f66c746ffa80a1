//! Constants for the Meteo station core
//!
//! All numeric values the station relies on live here, with units in the
//! name. Runtime-tunable values are mirrored as defaults in
//! [`crate::config::StationConfig`]; the values below are the firmware
//! defaults and the fixed protocol constants.
//!
//! ## Organization
//!
//! - **Time**: unit conversions, NTP epoch, timezone offsets, DST rule
//! - **Thresholds**: change-detection window and classification tiers
//! - **Display**: dwell times, LED colors, comfort pressure band

/// Time conversions, NTP constants and the DST rule.
pub mod time;

/// Change-detection window size and per-metric thresholds.
pub mod thresholds;

/// Display rotation, LED and pressure-comfort defaults.
pub mod display;

pub use time::{
    MS_PER_SECOND, SECONDS_PER_HOUR, SECONDS_PER_WEEK,
    NTP_UNIX_EPOCH_DELTA_S, NTP_TIMEOUT_MS,
};

pub use thresholds::HISTORY_CAPACITY;
