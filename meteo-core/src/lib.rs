//! Core engine of the Meteo environmental station
//!
//! Samples temperature, humidity and pressure, keeps local time through
//! network sync with a battery-backed fallback clock, and raises a visual
//! alert when recent readings drift significantly.
//!
//! Everything here is hardware-free. Sensors, display, LED, network and the
//! persisted clock are reached through the traits in [`traits`].
//!
//! Key constraints:
//! - Single-threaded, cooperative; no task is preempted
//! - No heap allocation after the scheduler is built
//! - Injected tick source and delay, so the whole loop runs under test
//!
//! ```no_run
//! use meteo_core::{ChangeDetector, Metric, Observation};
//!
//! let mut detector = ChangeDetector::new();
//! let reading = Observation::new()
//!     .with(Metric::InsideTemperature, 21.0)
//!     .with(Metric::Humidity, 40.0)
//!     .with(Metric::Pressure, 750.0);
//!
//! let report = detector.record(&reading);
//! for (label, icon) in report.pairs() {
//!     // show label next to icon
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod civil_time;
pub mod config;
pub mod constants;
pub mod detector;
pub mod errors;
pub mod forecast;
pub mod history;
pub mod led;
pub mod observation;
pub mod scheduler;
pub mod time;
pub mod traits;

// Public API
pub use civil_time::{CivilClock, DstRule, LocalTime, UnixSeconds};
pub use config::StationConfig;
pub use detector::{ChangeDetector, ChangeReport, ChangeThresholds, Significance};
pub use errors::{StationError, StationResult};
pub use observation::{Icon, Metric, Observation, RawValue};
pub use scheduler::{Scheduler, Task, TickReport};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
