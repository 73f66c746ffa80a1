//! Presenter that renders screens as log records
//!
//! For headless hosts and for watching the rotation during development.
//! Each screen becomes one `info` line tagged with the icon name.

use meteo_core::civil_time::LocalTime;
use meteo_core::observation::{Icon, Metric};
use meteo_core::traits::Presenter;
use meteo_core::StationResult;

/// Logs every screen at `info`
#[derive(Debug, Clone, Default)]
pub struct LogPresenter {
    drawn: u64,
    last: Option<String>,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screens drawn so far
    pub fn drawn(&self) -> u64 {
        self.drawn
    }

    /// Text of the most recent screen
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    fn emit(&mut self, line: String) -> StationResult<()> {
        log::info!("{}", line);
        self.drawn += 1;
        self.last = Some(line);
        Ok(())
    }
}

impl Presenter for LogPresenter {
    fn show_reading(&mut self, metric: Metric, icon: Icon, value: &str) -> StationResult<()> {
        self.emit(format!("[{}] {}: {}", icon.tag(), metric.name(), value))
    }

    fn show_forecast(&mut self, icon: Icon, description: &str) -> StationResult<()> {
        self.emit(format!("[{}] tomorrow: {}", icon.tag(), description))
    }

    fn show_alert(&mut self, label: &str, icon: Icon) -> StationResult<()> {
        self.emit(format!("[{}] change {}", icon.tag(), label))
    }

    fn show_clock(&mut self, time: &LocalTime) -> StationResult<()> {
        self.emit(format!("[clock] {:02}:{:02}", time.hour, time.minute))
    }
}
