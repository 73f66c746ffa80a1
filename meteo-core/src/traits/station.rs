//! External collaborators of the station loop
//!
//! Value-level interfaces to sensors, network, persisted clock, display and
//! LED. Implementations own their drivers; the core only sees values and
//! [`StationResult`]s.

use crate::civil_time::{LocalTime, UnixSeconds};
use crate::errors::{StationError, StationResult};
use crate::observation::{Icon, Metric, Observation};

/// Source of sensor snapshots
pub trait ObservationSource {
    /// Read every sensor once
    ///
    /// Sensors that don't respond leave their field `None`; an error means
    /// nothing at all could be read.
    fn read(&mut self) -> StationResult<Observation>;
}

/// Network time, one round trip with a short timeout
pub trait NetworkTimeSource {
    fn fetch_utc(&mut self) -> StationResult<UnixSeconds>;
}

/// Battery-backed clock holding local time
pub trait PersistentClock {
    fn read(&mut self) -> StationResult<LocalTime>;

    fn write(&mut self, time: &LocalTime) -> StationResult<()>;
}

/// The station's display
///
/// Each call draws one full screen; how long it stays up is decided by the
/// scheduler.
pub trait Presenter {
    fn show_reading(&mut self, metric: Metric, icon: Icon, value: &str) -> StationResult<()>;

    fn show_forecast(&mut self, icon: Icon, description: &str) -> StationResult<()>;

    fn show_alert(&mut self, label: &str, icon: Icon) -> StationResult<()>;

    fn show_clock(&mut self, time: &LocalTime) -> StationResult<()>;
}

/// Headless station; every screen succeeds without drawing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplay;

impl Presenter for NoDisplay {
    fn show_reading(&mut self, _metric: Metric, _icon: Icon, _value: &str) -> StationResult<()> {
        Ok(())
    }

    fn show_forecast(&mut self, _icon: Icon, _description: &str) -> StationResult<()> {
        Ok(())
    }

    fn show_alert(&mut self, _label: &str, _icon: Icon) -> StationResult<()> {
        Ok(())
    }

    fn show_clock(&mut self, _time: &LocalTime) -> StationResult<()> {
        Ok(())
    }
}

/// RGB color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const OFF: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Components are clamped to `[0, 1]`
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: clamp_unit(r),
            g: clamp_unit(g),
            b: clamp_unit(b),
        }
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v > 1.0 {
        1.0
    } else if v >= 0.0 {
        v
    } else {
        // also catches NaN
        0.0
    }
}

/// Status LED
///
/// Setting the color it already shows must be harmless.
pub trait Annunciator {
    fn set_color(&mut self, color: Rgb) -> StationResult<()>;
}

/// Board without an LED
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnnunciator;

impl Annunciator for NoAnnunciator {
    fn set_color(&mut self, _color: Rgb) -> StationResult<()> {
        Ok(())
    }
}

/// Network association (Wi-Fi or similar)
pub trait NetworkLink {
    /// Try once to bring the link up
    fn connect(&mut self) -> StationResult<()>;

    fn is_connected(&self) -> bool;
}

/// Station without networking
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl NetworkLink for Offline {
    fn connect(&mut self) -> StationResult<()> {
        Err(StationError::NetworkUnavailable)
    }

    fn is_connected(&self) -> bool {
        false
    }
}

/// Weather forecast service
pub trait ForecastSource {
    /// WMO weather code forecast for tomorrow
    fn tomorrow_code(&mut self) -> StationResult<u8>;
}
