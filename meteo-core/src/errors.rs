//! Error Types for the Station Core
//!
//! ## Design Philosophy
//!
//! The station runs unattended, so no error here is ever fatal. Every
//! variant describes a degraded condition the caller can route around:
//!
//! 1. **Small Size**: Errors are `Copy` and carry only `&'static str`
//!    context, so they can be stored in the per-tick report without
//!    allocation.
//!
//! 2. **Classified**: Each variant maps to one failure class of the station
//!    (sensor, network, clock, presentation, configuration), which decides
//!    the degradation applied by the scheduler.
//!
//! ## Error Categories
//!
//! ### Sensor
//! - `SensorUnavailable`: The observation source did not respond at all
//!
//! A value that is present but not numeric is not an error: it is cleaned
//! away and shown as missing.
//!
//! ### Network
//! - `NetworkUnavailable`: The link is down or could not be brought up
//! - `NetworkTimeout`: A single blocking call exceeded its timeout
//! - `MalformedReply`: The peer answered with something we can't decode
//! - `ForecastUnavailable`: No usable forecast in the response
//!
//! ### Clock
//! - `ClockUnavailable`: The persistent clock could not be read or written
//! - `InvalidDate`: A timestamp or date tuple outside the supported range
//!
//! ### Output and configuration
//! - `PresentationFailed`: The display driver rejected a screen
//! - `InvalidConfig`: A configuration value can't drive the scheduler
//!
//! ## Handling Strategy
//!
//! ```rust
//! use meteo_core::StationError;
//!
//! fn degrade(err: StationError) -> &'static str {
//!     match err {
//!         StationError::NetworkTimeout | StationError::NetworkUnavailable => {
//!             // keep the persisted clock, try again on the next resync
//!             "offline"
//!         }
//!         StationError::PresentationFailed { .. } => "skip screen",
//!         _ => "log and continue",
//!     }
//! }
//! # assert_eq!(degrade(StationError::NetworkTimeout), "offline");
//! ```

use thiserror_no_std::Error;

/// Result type for station operations
pub type StationResult<T> = Result<T, StationError>;

/// Station errors - kept small and `Copy` for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationError {
    /// The observation source did not return any data
    #[error("Sensor unavailable: {sensor}")]
    SensorUnavailable {
        /// Which sensor (or sensor bus) failed to respond
        sensor: &'static str,
    },

    /// Network link is down
    #[error("Network unavailable")]
    NetworkUnavailable,

    /// A blocking network call hit its timeout
    #[error("Network request timed out")]
    NetworkTimeout,

    /// Reply did not match the expected wire format
    #[error("Malformed reply: {reason}")]
    MalformedReply {
        /// What was wrong with the reply
        reason: &'static str,
    },

    /// Forecast service answered without a usable forecast
    #[error("Forecast unavailable")]
    ForecastUnavailable,

    /// Persistent clock could not be accessed
    #[error("Persistent clock unavailable")]
    ClockUnavailable,

    /// Timestamp or date outside the representable range
    #[error("Invalid date")]
    InvalidDate,

    /// Display driver failed to render a screen
    #[error("Presentation failed: {screen}")]
    PresentationFailed {
        /// Screen that failed to render
        screen: &'static str,
    },

    /// Configuration value rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which constraint was violated
        reason: &'static str,
    },
}

impl StationError {
    /// True for failures caused by the network side (link, timeout, reply)
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::NetworkUnavailable
                | Self::NetworkTimeout
                | Self::MalformedReply { .. }
                | Self::ForecastUnavailable
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StationError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SensorUnavailable { sensor } => {
                defmt::write!(fmt, "Sensor unavailable: {}", sensor)
            }
            Self::NetworkUnavailable => defmt::write!(fmt, "Network unavailable"),
            Self::NetworkTimeout => defmt::write!(fmt, "Network timeout"),
            Self::MalformedReply { reason } => defmt::write!(fmt, "Malformed reply: {}", reason),
            Self::ForecastUnavailable => defmt::write!(fmt, "Forecast unavailable"),
            Self::ClockUnavailable => defmt::write!(fmt, "Clock unavailable"),
            Self::InvalidDate => defmt::write!(fmt, "Invalid date"),
            Self::PresentationFailed { screen } => {
                defmt::write!(fmt, "Presentation failed: {}", screen)
            }
            Self::InvalidConfig { reason } => defmt::write!(fmt, "Invalid config: {}", reason),
        }
    }
}
