//! Time Source Abstraction for the Station Loop
//!
//! The scheduler never reads a wall clock to decide whether a task is due.
//! It reads a free-running millisecond counter through [`TimeSource`] and
//! compares counts with a wrapping difference, so the counter may roll over
//! (every ~49.7 days for a `u32`) without a task being skipped or fired
//! twice.
//!
//! ## Common Implementations
//!
//! - `SystemTime`: `std::time::Instant` based, for hosted builds
//! - `MockTimeSource`: Controllable time for testing, doubles as a delay
//! - A hardware timer peripheral on bare metal (implemented by the board crate)

use crate::time::Ticks;

/// Monotonic millisecond counter
///
/// ## Implementation Requirements
///
/// - `now()` must never go backwards except by wrapping past `u32::MAX`
/// - One tick is one millisecond; coarser hardware counters scale up
///
/// ## Example Implementation
///
/// ```rust
/// use meteo_core::traits::TimeSource;
/// use meteo_core::time::Ticks;
///
/// struct TimerPeripheral {
///     // ... 1 kHz hardware counter
/// }
///
/// impl TimeSource for TimerPeripheral {
///     fn now(&self) -> Ticks {
///         0 // read the counter register
///     }
/// }
/// ```
pub trait TimeSource {
    /// Current tick count in milliseconds since an arbitrary origin
    fn now(&self) -> Ticks;
}
