//! Core Traits and Abstractions
//!
//! The station core never touches hardware. Everything outside the
//! scheduling, detection and time logic is reached through the traits in
//! this module, implemented by board crates on the device and by
//! `meteo-connectors` or test mocks on a host.
//!
//! ## Module Organization
//!
//! - [`time`] - Monotonic tick source
//! - [`station`] - Sensors, network, clock, display and LED collaborators
//!
//! ## Failure Contract
//!
//! Every fallible collaborator returns [`crate::StationResult`]. The
//! scheduler degrades its own output on error (empty report, skipped
//! screen, kept clock) and never lets a collaborator failure leave the
//! tick.

pub mod station;
pub mod time;

pub use station::{
    Annunciator, ForecastSource, NetworkLink, NetworkTimeSource, NoAnnunciator, NoDisplay,
    ObservationSource, Offline, PersistentClock, Presenter, Rgb,
};

pub use time::TimeSource;
