//! Host Adapters for the Meteo Station
//!
//! ## Overview
//!
//! `meteo-core` never touches a socket or a file. This crate provides the
//! std implementations of its collaborator traits, for running the station
//! on a Linux board or a development machine.
//!
//! | adapter | trait | transport |
//! |---|---|---|
//! | [`SntpClient`] | `NetworkTimeSource` | UDP, one round trip |
//! | `OpenMeteoClient` (feature `http`) | `ForecastSource` | HTTPS via `ureq` |
//! | [`FileClock`] | `PersistentClock` | JSON file |
//! | [`LogPresenter`] | `Presenter` | `log` records |
//! | [`HostLink`] | `NetworkLink` | OS networking |
//!
//! and [`load_config`] for reading a `StationConfig` from JSON.
//!
//! ## Error Handling
//!
//! Adapters fail with [`ConnectorError`], which keeps the underlying I/O,
//! HTTP or JSON error for logging. At the trait boundary it is folded into
//! the core's small `StationError`, which is all the scheduler needs to
//! decide how to degrade.
//!
//! ## Example Usage
//!
//! ```no_run
//! use meteo_connectors::{FileClock, SntpClient};
//! use meteo_core::civil_time::CivilClock;
//!
//! let ntp = SntpClient::new("pool.ntp.org");
//! let rtc = FileClock::new("/var/lib/meteo/clock.json");
//! let mut clock = CivilClock::new(Box::new(ntp), Box::new(rtc));
//!
//! if clock.sync() {
//!     let now = clock.now_local()?;
//!     println!("{:02}:{:02}", now.hour, now.minute);
//! }
//! # Ok::<(), meteo_core::StationError>(())
//! ```

pub mod config;
pub mod file_clock;
pub mod forecast;
pub mod presenter;
pub mod sntp;

pub use config::load_config;
pub use file_clock::FileClock;
#[cfg(feature = "http")]
pub use forecast::{OpenMeteoClient, OpenMeteoConfig};
pub use presenter::LogPresenter;
pub use sntp::SntpClient;

use meteo_core::traits::NetworkLink;
use meteo_core::{StationError, StationResult};
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout")]
    Timeout,

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Server error {status}")]
    ServerError { status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No forecast in response")]
    NoForecast,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ConnectorError {
    /// True when a blocking call ran out of time
    pub fn is_timeout(&self) -> bool {
        match self {
            ConnectorError::Timeout => true,
            ConnectorError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

impl From<ConnectorError> for StationError {
    fn from(err: ConnectorError) -> Self {
        if err.is_timeout() {
            return StationError::NetworkTimeout;
        }
        match err {
            ConnectorError::Io(_) | ConnectorError::Http(_) => StationError::NetworkUnavailable,
            ConnectorError::ProtocolError(_) => StationError::MalformedReply { reason: "protocol" },
            ConnectorError::Json(_) => StationError::MalformedReply { reason: "json" },
            ConnectorError::ServerError { .. } | ConnectorError::NoForecast => {
                StationError::ForecastUnavailable
            }
            ConnectorError::ConfigError(_) => StationError::InvalidConfig {
                reason: "config file",
            },
            ConnectorError::Timeout => StationError::NetworkTimeout,
        }
    }
}

/// Network link of a host whose OS manages connectivity
///
/// The link is assumed up; failures surface on the individual requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostLink;

impl NetworkLink for HostLink {
    fn connect(&mut self) -> StationResult<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn timeouts_map_to_network_timeout() {
        let err = ConnectorError::Io(io::Error::new(io::ErrorKind::WouldBlock, "recv"));
        assert!(err.is_timeout());
        assert_eq!(StationError::from(err), StationError::NetworkTimeout);
        assert_eq!(StationError::from(ConnectorError::Timeout), StationError::NetworkTimeout);
    }

    #[test]
    fn other_failures_keep_their_class() {
        let refused = ConnectorError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "no"));
        assert_eq!(StationError::from(refused), StationError::NetworkUnavailable);
        assert_eq!(
            StationError::from(ConnectorError::ProtocolError("short".into())),
            StationError::MalformedReply { reason: "protocol" }
        );
        assert_eq!(
            StationError::from(ConnectorError::NoForecast),
            StationError::ForecastUnavailable
        );
    }

    #[test]
    fn host_link_is_up() {
        let mut link = HostLink;
        assert!(link.connect().is_ok());
        assert!(link.is_connected());
    }
}
