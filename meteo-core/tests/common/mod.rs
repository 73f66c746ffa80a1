//! Shared mock collaborators for the integration tests
//!
//! Every mock is a cheap handle over `Rc` state: one clone goes into the
//! scheduler, the test keeps another to script inputs and inspect what the
//! station did.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use meteo_core::civil_time::{CivilClock, LocalTime, UnixSeconds};
use meteo_core::config::StationConfig;
use meteo_core::observation::{Icon, Metric, Observation};
use meteo_core::scheduler::Scheduler;
use meteo_core::time::MockTimeSource;
use meteo_core::traits::{
    Annunciator, ForecastSource, NetworkLink, NetworkTimeSource, ObservationSource,
    PersistentClock, Presenter, Rgb,
};
use meteo_core::{StationError, StationResult};

pub mod scenarios;

/// A screen as drawn by the presenter
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Reading {
        metric: Metric,
        icon: &'static str,
        value: String,
    },
    Forecast {
        icon: &'static str,
        description: String,
    },
    Alert {
        label: String,
        icon: &'static str,
    },
    Clock {
        hour: u8,
        minute: u8,
    },
}

impl Screen {
    pub fn reading(metric: Metric, icon: &'static str, value: &str) -> Self {
        let value = value.to_string();
        Screen::Reading { metric, icon, value }
    }

    pub fn forecast(icon: &'static str, description: &str) -> Self {
        let description = description.to_string();
        Screen::Forecast { icon, description }
    }

    pub fn alert(label: &str, icon: &'static str) -> Self {
        let label = label.to_string();
        Screen::Alert { label, icon }
    }

    pub fn clock(hour: u8, minute: u8) -> Self {
        Screen::Clock { hour, minute }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, Screen::Alert { .. })
    }

    pub fn is_clock(&self) -> bool {
        matches!(self, Screen::Clock { .. })
    }
}

/// Presenter that records every screen; can be told to fail on one kind
#[derive(Clone, Default)]
pub struct ScreenLog {
    screens: Rc<RefCell<Vec<Screen>>>,
    fail_on: Rc<Cell<Option<&'static str>>>,
}

impl ScreenLog {
    pub fn take(&self) -> Vec<Screen> {
        self.screens.borrow_mut().drain(..).collect()
    }

    pub fn fail_on(&self, screen: Option<&'static str>) {
        self.fail_on.set(screen);
    }

    fn draw(&self, kind: &'static str, screen: Screen) -> StationResult<()> {
        if self.fail_on.get() == Some(kind) {
            return Err(StationError::PresentationFailed { screen: kind });
        }
        self.screens.borrow_mut().push(screen);
        Ok(())
    }
}

impl Presenter for ScreenLog {
    fn show_reading(&mut self, metric: Metric, icon: Icon, value: &str) -> StationResult<()> {
        self.draw("reading", Screen::reading(metric, icon.tag(), value))
    }

    fn show_forecast(&mut self, icon: Icon, description: &str) -> StationResult<()> {
        self.draw("forecast", Screen::forecast(icon.tag(), description))
    }

    fn show_alert(&mut self, label: &str, icon: Icon) -> StationResult<()> {
        self.draw("alert", Screen::alert(label, icon.tag()))
    }

    fn show_clock(&mut self, time: &LocalTime) -> StationResult<()> {
        self.draw("clock", Screen::clock(time.hour, time.minute))
    }
}

/// LED that remembers every color written
#[derive(Clone, Default)]
pub struct LedLog {
    colors: Rc<RefCell<Vec<Rgb>>>,
}

impl LedLog {
    pub fn last(&self) -> Option<Rgb> {
        self.colors.borrow().last().copied()
    }

    pub fn count(&self) -> usize {
        self.colors.borrow().len()
    }
}

impl Annunciator for LedLog {
    fn set_color(&mut self, color: Rgb) -> StationResult<()> {
        self.colors.borrow_mut().push(color);
        Ok(())
    }
}

/// Sensors returning whatever the test last set
#[derive(Clone)]
pub struct SensorFeed {
    current: Rc<RefCell<StationResult<Observation>>>,
    reads: Rc<Cell<u32>>,
}

impl SensorFeed {
    pub fn new(observation: Observation) -> Self {
        Self {
            current: Rc::new(RefCell::new(Ok(observation))),
            reads: Rc::new(Cell::new(0)),
        }
    }

    pub fn set(&self, observation: Observation) {
        *self.current.borrow_mut() = Ok(observation);
    }

    pub fn fail(&self) {
        *self.current.borrow_mut() = Err(StationError::SensorUnavailable { sensor: "i2c" });
    }

    pub fn reads(&self) -> u32 {
        self.reads.get()
    }
}

impl ObservationSource for SensorFeed {
    fn read(&mut self) -> StationResult<Observation> {
        self.reads.set(self.reads.get() + 1);
        self.current.borrow().clone()
    }
}

/// NTP replies consumed in order; an empty script times out
#[derive(Clone, Default)]
pub struct NtpScript {
    replies: Rc<RefCell<VecDeque<StationResult<UnixSeconds>>>>,
    calls: Rc<Cell<u32>>,
}

impl NtpScript {
    pub fn reply(&self, utc: UnixSeconds) {
        self.replies.borrow_mut().push_back(Ok(utc));
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl NetworkTimeSource for NtpScript {
    fn fetch_utc(&mut self) -> StationResult<UnixSeconds> {
        self.calls.set(self.calls.get() + 1);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(StationError::NetworkTimeout))
    }
}

/// Battery-backed clock held in memory
#[derive(Clone, Default)]
pub struct MemoryRtc {
    time: Rc<RefCell<Option<LocalTime>>>,
    writes: Rc<Cell<u32>>,
    broken: Rc<Cell<bool>>,
}

impl MemoryRtc {
    pub fn holding(time: LocalTime) -> Self {
        let rtc = Self::default();
        *rtc.time.borrow_mut() = Some(time);
        rtc
    }

    pub fn current(&self) -> Option<LocalTime> {
        *self.time.borrow()
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    pub fn break_reads(&self) {
        self.broken.set(true);
    }
}

impl PersistentClock for MemoryRtc {
    fn read(&mut self) -> StationResult<LocalTime> {
        if self.broken.get() {
            return Err(StationError::ClockUnavailable);
        }
        self.time.borrow().ok_or(StationError::ClockUnavailable)
    }

    fn write(&mut self, time: &LocalTime) -> StationResult<()> {
        self.writes.set(self.writes.get() + 1);
        *self.time.borrow_mut() = Some(*time);
        Ok(())
    }
}

/// Link that is either up or down for the whole test
#[derive(Clone, Copy)]
pub struct StaticLink {
    pub up: bool,
}

impl NetworkLink for StaticLink {
    fn connect(&mut self) -> StationResult<()> {
        if self.up {
            Ok(())
        } else {
            Err(StationError::NetworkUnavailable)
        }
    }

    fn is_connected(&self) -> bool {
        self.up
    }
}

/// Forecast service answering with a settable code
#[derive(Clone)]
pub struct ForecastScript {
    code: Rc<Cell<Option<u8>>>,
    calls: Rc<Cell<u32>>,
}

impl ForecastScript {
    pub fn new(code: u8) -> Self {
        Self {
            code: Rc::new(Cell::new(Some(code))),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn set(&self, code: Option<u8>) {
        self.code.set(code);
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl ForecastSource for ForecastScript {
    fn tomorrow_code(&mut self) -> StationResult<u8> {
        self.calls.set(self.calls.get() + 1);
        self.code.get().ok_or(StationError::ForecastUnavailable)
    }
}

/// Everything a scheduler under test talks to
pub struct Rig {
    pub time: MockTimeSource,
    pub sensors: SensorFeed,
    pub ntp: NtpScript,
    pub rtc: MemoryRtc,
    pub screens: ScreenLog,
    pub led: LedLog,
    pub forecast: ForecastScript,
}

impl Rig {
    pub fn new(start: u32) -> Self {
        Self {
            time: MockTimeSource::new(start),
            sensors: SensorFeed::new(scenarios::calm()),
            ntp: NtpScript::default(),
            rtc: MemoryRtc::holding(scenarios::noon()),
            screens: ScreenLog::default(),
            led: LedLog::default(),
            forecast: ForecastScript::new(61),
        }
    }

    pub fn scheduler(
        &self,
        config: StationConfig,
        online: bool,
    ) -> Scheduler<MockTimeSource, MockTimeSource> {
        let clock = CivilClock::new(Box::new(self.ntp.clone()), Box::new(self.rtc.clone()));

        Scheduler::builder(self.time.clone(), self.time.clone(), self.sensors.clone(), clock)
            .config(config)
            .presenter(self.screens.clone())
            .annunciator(self.led.clone())
            .forecast(self.forecast.clone())
            .network(StaticLink { up: online })
            .build()
            .expect("valid config")
    }
}

/// Config with zero dwell and pause so simulated time moves only when a
/// test moves it
pub fn instant_config() -> StationConfig {
    StationConfig::default()
        .with_dwells_s(0, 0, 0)
        .with_pacing_s(0, 0)
        .with_network_retries(1, 0)
}
