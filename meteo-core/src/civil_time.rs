//! Civil Time: network sync, persisted clock and the DST rule
//!
//! ## Overview
//!
//! The station shows local wall-clock time but has no reliable source of it
//! on its own. Two sources are combined:
//!
//! - **Network time** (SNTP): exact UTC, but only when the link is up
//! - **Persisted clock** (battery-backed RTC): survives power loss, drifts
//!
//! All timezone work happens at sync time. [`CivilClock::sync`] fetches UTC,
//! decides whether summer time applies, and writes *local* time into the
//! persisted clock. [`CivilClock::now_local`] then simply reads the
//! persisted clock back. Between syncs the RTC keeps ticking on its own,
//! and a failed sync leaves it untouched.
//!
//! ## DST Rule
//!
//! Summer time starts at 03:00 UTC on the last Sunday of March and ends at
//! 04:00 UTC on the last Sunday of October. Offsets are UTC+2 standard and
//! UTC+3 summer. The last Sunday is found by taking the last day of the
//! month and walking back by its weekday distance from Sunday:
//!
//! ```text
//! March 2025: 31st is a Monday (1 day after Sunday) -> last Sunday = 30
//! March 2024: 31st is a Sunday (0 days)             -> last Sunday = 31
//! ```
//!
//! ## Weekday Conventions
//!
//! Two numberings meet in this module:
//!
//! | where | numbering |
//! |---|---|
//! | DST math (`chrono::Weekday::num_days_from_sunday`) | Sunday=0 .. Saturday=6 |
//! | persisted clock ([`LocalTime::weekday`]) | Monday=1 .. Sunday=7 |
//!
//! [`rtc_weekday`] is the only place converting between them.

use alloc::boxed::Box;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::constants::time::{
    DST_END_HOUR_UTC, DST_END_MONTH, DST_OFFSET_S, DST_START_HOUR_UTC, DST_START_MONTH,
    STANDARD_OFFSET_S,
};
use crate::errors::{StationError, StationResult};
use crate::traits::{NetworkTimeSource, PersistentClock};

/// UTC seconds since the Unix epoch
pub type UnixSeconds = i64;

/// Convert a Sunday-based weekday index (Sunday=0) to the persisted clock's
/// Monday=1..Sunday=7 numbering
///
/// ```rust
/// use meteo_core::civil_time::rtc_weekday;
///
/// assert_eq!(rtc_weekday(0), 7); // Sunday
/// assert_eq!(rtc_weekday(1), 1); // Monday
/// assert_eq!(rtc_weekday(6), 6); // Saturday
/// ```
pub const fn rtc_weekday(days_from_sunday: u32) -> u8 {
    match days_from_sunday % 7 {
        0 => 7,
        n => n as u8,
    }
}

/// Local date and time as held by the persisted clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Monday=1 .. Sunday=7
    pub weekday: u8,
}

impl LocalTime {
    /// Validated local time; the weekday is derived from the date
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> StationResult<Self> {
        let naive = NaiveDate::from_ymd_opt(year, month as u32, day as u32)
            .and_then(|d| d.and_hms_opt(hour as u32, minute as u32, second as u32))
            .ok_or(StationError::InvalidDate)?;
        Ok(Self::from_naive(&naive))
    }

    pub fn from_naive(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
            weekday: rtc_weekday(dt.weekday().num_days_from_sunday()),
        }
    }

    pub fn to_naive(&self) -> StationResult<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)
            .and_then(|d| d.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32))
            .ok_or(StationError::InvalidDate)
    }

    /// `(Y, M, D, h, m, s, weekday)`
    pub const fn as_tuple(&self) -> (i32, u8, u8, u8, u8, u8, u8) {
        (self.year, self.month, self.day, self.hour, self.minute, self.second, self.weekday)
    }
}

/// Fixed yearly daylight-saving rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DstRule {
    pub start_month: u32,
    pub start_hour_utc: u32,
    pub end_month: u32,
    pub end_hour_utc: u32,
    pub standard_offset_s: i32,
    pub dst_offset_s: i32,
}

impl Default for DstRule {
    fn default() -> Self {
        Self {
            start_month: DST_START_MONTH,
            start_hour_utc: DST_START_HOUR_UTC,
            end_month: DST_END_MONTH,
            end_hour_utc: DST_END_HOUR_UTC,
            standard_offset_s: STANDARD_OFFSET_S,
            dst_offset_s: DST_OFFSET_S,
        }
    }
}

impl DstRule {
    /// Day of month of the last Sunday
    pub fn last_sunday(year: i32, month: u32) -> StationResult<u32> {
        let last_day = last_day_of_month(year, month)?;
        let offset = last_day.weekday().num_days_from_sunday();
        Ok(last_day.day() - offset)
    }

    /// `[start, end)` of summer time in `year`, as UTC seconds
    pub fn dst_window(&self, year: i32) -> StationResult<(UnixSeconds, UnixSeconds)> {
        let start = Self::boundary(year, self.start_month, self.start_hour_utc)?;
        let end = Self::boundary(year, self.end_month, self.end_hour_utc)?;
        Ok((start, end))
    }

    pub fn is_dst(&self, utc: UnixSeconds) -> StationResult<bool> {
        let year = utc_datetime(utc)?.year();
        let (start, end) = self.dst_window(year)?;
        Ok(start <= utc && utc < end)
    }

    /// Offset from UTC in effect at `utc`
    pub fn offset_seconds(&self, utc: UnixSeconds) -> StationResult<i32> {
        Ok(if self.is_dst(utc)? {
            self.dst_offset_s
        } else {
            self.standard_offset_s
        })
    }

    /// Civil time at `utc`
    pub fn to_local(&self, utc: UnixSeconds) -> StationResult<LocalTime> {
        let offset = self.offset_seconds(utc)?;
        let local = utc_datetime(utc + offset as i64)?;
        Ok(LocalTime::from_naive(&local))
    }

    fn boundary(year: i32, month: u32, hour_utc: u32) -> StationResult<UnixSeconds> {
        let day = Self::last_sunday(year, month)?;
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour_utc, 0, 0))
            .map(|dt| dt.and_utc().timestamp())
            .ok_or(StationError::InvalidDate)
    }
}

fn last_day_of_month(year: i32, month: u32) -> StationResult<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .filter(|_| (1..=12).contains(&month))
        .ok_or(StationError::InvalidDate)
}

fn utc_datetime(utc: UnixSeconds) -> StationResult<NaiveDateTime> {
    DateTime::from_timestamp(utc, 0)
        .map(|dt| dt.naive_utc())
        .ok_or(StationError::InvalidDate)
}

/// Sync bookkeeping for the current run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockState {
    /// UTC of the last successful network sync
    pub last_sync_utc: Option<UnixSeconds>,
    /// Whether the persisted clock was written since boot
    pub rtc_updated: bool,
    /// Last local time read or written
    pub resolved: Option<LocalTime>,
}

/// Local time from network sync with persisted-clock fallback
pub struct CivilClock {
    network: Box<dyn NetworkTimeSource>,
    rtc: Box<dyn PersistentClock>,
    rule: DstRule,
    state: ClockState,
}

impl CivilClock {
    pub fn new(network: Box<dyn NetworkTimeSource>, rtc: Box<dyn PersistentClock>) -> Self {
        Self {
            network,
            rtc,
            rule: DstRule::default(),
            state: ClockState::default(),
        }
    }

    pub fn with_rule(mut self, rule: DstRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn rule(&self) -> &DstRule {
        &self.rule
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    /// Fetch network time and store local time in the persisted clock
    ///
    /// Returns `false` and leaves the persisted clock untouched on any
    /// failure.
    pub fn sync(&mut self) -> bool {
        match self.try_sync() {
            Ok(local) => {
                log_info!(
                    "Clock synchronized: {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    local.year, local.month, local.day, local.hour, local.minute, local.second
                );
                true
            }
            Err(err) => {
                log_warn!("Clock sync failed: {}", err);
                false
            }
        }
    }

    /// [`sync`](Self::sync) with the failure reason kept
    pub fn try_sync(&mut self) -> StationResult<LocalTime> {
        let utc = self.network.fetch_utc()?;
        let dst = self.rule.is_dst(utc)?;
        let local = self.rule.to_local(utc)?;

        self.rtc.write(&local)?;

        log_debug!("DST active: {}", dst);
        self.state.last_sync_utc = Some(utc);
        self.state.rtc_updated = true;
        self.state.resolved = Some(local);
        Ok(local)
    }

    /// Local time from the persisted clock, verbatim
    ///
    /// If the clock can't be read, the last time resolved this run is
    /// returned instead.
    pub fn now_local(&mut self) -> StationResult<LocalTime> {
        match self.rtc.read() {
            Ok(local) => {
                self.state.resolved = Some(local);
                Ok(local)
            }
            Err(err) => {
                log_warn!("Persistent clock read failed: {}", err);
                self.state.resolved.ok_or(err)
            }
        }
    }
}
