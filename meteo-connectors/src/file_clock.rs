//! Persistent clock backed by a JSON file
//!
//! A hardware RTC keeps counting while the station is off. A file does
//! not, so alongside the local time we store the host's UTC instant at the
//! moment of writing and add the elapsed wall time on every read.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use meteo_core::civil_time::LocalTime;
use meteo_core::traits::PersistentClock;
use meteo_core::{StationError, StationResult};

use crate::ConnectorError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StoredClock {
    local: LocalTime,
    /// Host UTC seconds when `local` was written
    written_at: u64,
}

/// File-backed [`PersistentClock`]
#[derive(Debug, Clone)]
pub struct FileClock {
    path: PathBuf,
}

fn host_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl FileClock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoredClock, ConnectorError> {
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn store(&self, stored: &StoredClock) -> Result<(), ConnectorError> {
        let json = serde_json::to_string(stored)?;
        // write-then-rename so a crash never leaves half a file
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Stored time advanced by the host time elapsed since it was written
    fn advance(stored: &StoredClock, now: u64) -> StationResult<LocalTime> {
        let elapsed = now.saturating_sub(stored.written_at);
        let elapsed = i64::try_from(elapsed).map_err(|_| StationError::InvalidDate)?;
        let delta = TimeDelta::try_seconds(elapsed).ok_or(StationError::InvalidDate)?;

        let naive = stored.local.to_naive()?;
        naive
            .checked_add_signed(delta)
            .map(|dt| LocalTime::from_naive(&dt))
            .ok_or(StationError::InvalidDate)
    }
}

impl PersistentClock for FileClock {
    fn read(&mut self) -> StationResult<LocalTime> {
        let stored = self.load().map_err(|err| {
            log::warn!("Clock file {} unreadable: {}", self.path.display(), err);
            StationError::ClockUnavailable
        })?;
        Self::advance(&stored, host_seconds())
    }

    fn write(&mut self, time: &LocalTime) -> StationResult<()> {
        let stored = StoredClock {
            local: *time,
            written_at: host_seconds(),
        };
        self.store(&stored).map_err(|err| {
            log::error!("Clock file {} not written: {}", self.path.display(), err);
            StationError::ClockUnavailable
        })
    }
}
