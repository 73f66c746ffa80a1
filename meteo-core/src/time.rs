//! Monotonic time for the station loop
//!
//! Provides the tick counter type, the wrap-safe difference used for every
//! due-ness decision, the per-task [`IntervalTimer`], and time sources:
//! - System clock (hosted builds)
//! - Mock clock (tests), which also implements `DelayNs` so that a dwell
//!   or back-off advances simulated time instead of sleeping

use alloc::rc::Rc;
use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use fugit::MillisDurationU32;

pub use crate::traits::TimeSource;

/// Milliseconds on a free-running counter that wraps at `u32::MAX`
pub type Ticks = u32;

/// Milliseconds elapsed from `earlier` to `later`, tolerant of one wrap
///
/// ```rust
/// use meteo_core::time::ticks_diff;
///
/// assert_eq!(ticks_diff(1500, 1000), 500);
/// // counter wrapped between the two reads
/// assert_eq!(ticks_diff(100, u32::MAX - 99), 200);
/// ```
pub const fn ticks_diff(later: Ticks, earlier: Ticks) -> u32 {
    later.wrapping_sub(earlier)
}

/// Last-fired tick and interval of one periodic task
///
/// A task is due once the time elapsed since it last fired reaches its
/// interval; the boundary is inclusive.
///
/// Elapsed time is measured on the wrapping counter, so it can only be
/// trusted up to one full cycle (~49.7 days). A task that keeps failing for
/// longer than that would look fresh again; [`poll`](Self::poll) latches
/// the due state until the next [`mark`](Self::mark) to prevent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    interval: MillisDurationU32,
    last_fired: Ticks,
    overdue: bool,
}

impl IntervalTimer {
    /// Timer that becomes due one full interval after `now`
    pub const fn armed(interval: MillisDurationU32, now: Ticks) -> Self {
        Self {
            interval,
            last_fired: now,
            overdue: false,
        }
    }

    /// Timer that is already due at `now`
    pub const fn due_at(interval: MillisDurationU32, now: Ticks) -> Self {
        Self {
            interval,
            last_fired: now.wrapping_sub(interval.to_millis()),
            overdue: true,
        }
    }

    /// Configured interval
    pub const fn interval(&self) -> MillisDurationU32 {
        self.interval
    }

    /// Tick at which the task last fired
    pub const fn last_fired(&self) -> Ticks {
        self.last_fired
    }

    /// Milliseconds since the task last fired
    pub const fn elapsed(&self, now: Ticks) -> u32 {
        ticks_diff(now, self.last_fired)
    }

    /// True when `elapsed >= interval`
    ///
    /// Stateless; see [`poll`](Self::poll) for tasks that may stay due for
    /// longer than one counter cycle.
    pub const fn is_due(&self, now: Ticks) -> bool {
        self.elapsed(now) >= self.interval.to_millis()
    }

    /// Like [`is_due`](Self::is_due), but once due stays due until marked
    pub fn poll(&mut self, now: Ticks) -> bool {
        self.overdue |= self.is_due(now);
        self.overdue
    }

    /// Record that the task fired at `now`
    pub fn mark(&mut self, now: Ticks) {
        self.last_fired = now;
        self.overdue = false;
    }
}

/// System time source (requires std)
///
/// Counts milliseconds since construction; truncation to `u32` is the
/// intended wrap.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemTime {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemTime {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Ticks {
        self.origin.elapsed().as_millis() as Ticks
    }
}

/// Blocking delay backed by `std::thread::sleep`
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

/// Controllable time source for testing
///
/// Clones share the same counter, so one handle can be given to the
/// scheduler as its clock and another as its delay; every delay then
/// advances the clock the scheduler reads.
#[derive(Debug, Clone)]
pub struct MockTimeSource {
    now: Rc<Cell<Ticks>>,
    /// Sub-millisecond remainder accumulated from `delay_ns`
    pending_ns: Rc<Cell<u32>>,
}

impl MockTimeSource {
    pub fn new(start: Ticks) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
            pending_ns: Rc::new(Cell::new(0)),
        }
    }

    pub fn set(&self, ticks: Ticks) {
        self.now.set(ticks);
    }

    /// Move the counter forward, wrapping like real hardware
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Ticks {
        self.now.get()
    }
}

impl DelayNs for MockTimeSource {
    fn delay_ns(&mut self, ns: u32) {
        let total = self.pending_ns.get() as u64 + ns as u64;
        self.advance((total / 1_000_000) as u32);
        self.pending_ns.set((total % 1_000_000) as u32);
    }

    fn delay_us(&mut self, us: u32) {
        let total = self.pending_ns.get() as u64 + us as u64 * 1000;
        self.advance((total / 1_000_000) as u32);
        self.pending_ns.set((total % 1_000_000) as u32);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}
