//! Cooperative station loop
//!
//! One thread, one loop, no preemption. Each [`Scheduler::tick`] walks the
//! periodic tasks in a fixed order and runs the ones that are due:
//!
//! ```text
//! 1. time resync     only when online; timer re-armed on success only
//! 2. sensor check    read -> ChangeDetector -> pending alerts + level
//! 3. LED             every tick, driven by the current level
//! 4. display         readings, forecast (online + due), alerts, clock
//! ```
//!
//! A task that fails is logged and recorded in the [`TickReport`]; the
//! tasks after it still run. Screens dwell through the injected
//! [`DelayNs`], so a long rotation delays the next tick rather than
//! interrupting anything.
//!
//! ## Faults
//!
//! The resync, the sensor check, the forecast and every single screen
//! guard their own failures: a timeout, a silent sensor or a screen the
//! display rejects degrades that output and nothing else, and the loop
//! keeps its normal pace. A failure outside those guards (the LED driver)
//! makes [`Scheduler::pace`] sleep the longer fault back-off.
//!
//! ## Timing
//!
//! Every due-ness decision compares wrap-safe millisecond ticks and is
//! inclusive: a task with a 300 s interval fires on the tick where exactly
//! 300 000 ms have elapsed.
//!
//! ## Example
//!
//! ```rust
//! use meteo_core::civil_time::CivilClock;
//! use meteo_core::scheduler::Scheduler;
//! use meteo_core::time::MockTimeSource;
//! # use meteo_core::civil_time::{LocalTime, UnixSeconds};
//! # use meteo_core::observation::Observation;
//! # use meteo_core::traits::{NetworkTimeSource, ObservationSource, PersistentClock};
//! # use meteo_core::{StationError, StationResult};
//! # struct Sensors;
//! # impl ObservationSource for Sensors {
//! #     fn read(&mut self) -> StationResult<Observation> { Ok(Observation::new()) }
//! # }
//! # struct NoNtp;
//! # impl NetworkTimeSource for NoNtp {
//! #     fn fetch_utc(&mut self) -> StationResult<UnixSeconds> {
//! #         Err(StationError::NetworkTimeout)
//! #     }
//! # }
//! # struct Rtc;
//! # impl PersistentClock for Rtc {
//! #     fn read(&mut self) -> StationResult<LocalTime> { LocalTime::new(2025, 1, 1, 0, 0, 0) }
//! #     fn write(&mut self, _: &LocalTime) -> StationResult<()> { Ok(()) }
//! # }
//!
//! let time = MockTimeSource::new(0);
//! let clock = CivilClock::new(Box::new(NoNtp), Box::new(Rtc));
//!
//! let mut scheduler = Scheduler::builder(time.clone(), time.clone(), Sensors, clock)
//!     .build()
//!     .unwrap();
//!
//! scheduler.start();
//! let report = scheduler.tick();
//! assert!(report.is_clean());
//! ```

use alloc::boxed::Box;

use embedded_hal::delay::DelayNs;
use fugit::MillisDurationU32;
use heapless::Vec;

use crate::civil_time::CivilClock;
use crate::config::StationConfig;
use crate::detector::{ChangeDetector, ChangeReport, Significance};
use crate::errors::{StationError, StationResult};
use crate::forecast::Forecast;
use crate::led::LedController;
use crate::observation::{Icon, Metric, Observation};
use crate::time::{IntervalTimer, Ticks, TimeSource};
use crate::traits::{
    Annunciator, ForecastSource, NetworkLink, NoAnnunciator, NoDisplay, ObservationSource,
    Offline, Presenter,
};

/// Number of distinct tasks, and so the capacity of a tick report
pub const TASK_COUNT: usize = 5;

/// Periodic tasks of the station loop, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    TimeSync,
    SensorCheck,
    Led,
    Display,
    Forecast,
}

impl Task {
    pub const fn name(&self) -> &'static str {
        match self {
            Task::TimeSync => "time sync",
            Task::SensorCheck => "sensor check",
            Task::Led => "led",
            Task::Display => "display",
            Task::Forecast => "forecast",
        }
    }

    /// Whether a failure of this task only degrades its own output
    pub const fn fails_soft(&self) -> bool {
        !matches!(self, Task::Led)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Task {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.name())
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Tick at which the pass started
    pub started_at: Ticks,
    /// Tasks that ran, in order
    pub fired: Vec<Task, TASK_COUNT>,
    /// Unguarded failures; any entry triggers the fault back-off
    pub failures: Vec<(Task, StationError), TASK_COUNT>,
    /// Guarded failures: output skipped or left at its fallback
    pub degraded: Vec<(Task, StationError), TASK_COUNT>,
    /// Significance level in effect at the end of the tick
    pub significance: Significance,
}

impl TickReport {
    fn new(started_at: Ticks) -> Self {
        Self {
            started_at,
            ..Self::default()
        }
    }

    /// True when nothing failed or degraded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.degraded.is_empty()
    }

    pub fn needs_backoff(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn ran(&self, task: Task) -> bool {
        self.fired.contains(&task)
    }

    /// First recorded failure of a task, guarded or not
    pub fn failure(&self, task: Task) -> Option<StationError> {
        self.failures
            .iter()
            .chain(self.degraded.iter())
            .find(|(t, _)| *t == task)
            .map(|(_, e)| *e)
    }

    fn fire(&mut self, task: Task) {
        if !self.fired.contains(&task) {
            // one slot per task, cannot overflow
            let _ = self.fired.push(task);
        }
    }

    fn fail(&mut self, task: Task, err: StationError) {
        let list = if task.fails_soft() {
            log_warn!("Task '{}' degraded: {}", task.name(), err);
            &mut self.degraded
        } else {
            log_error!("Task '{}' failed: {}", task.name(), err);
            &mut self.failures
        };
        if list.iter().all(|(t, _)| *t != task) {
            let _ = list.push((task, err));
        }
    }
}

/// The station's main loop
///
/// Generic over the tick source and the delay provider; every other
/// collaborator is boxed so boards can mix drivers freely.
pub struct Scheduler<T: TimeSource, D: DelayNs> {
    config: StationConfig,
    time: T,
    delay: D,
    sensors: Box<dyn ObservationSource>,
    clock: CivilClock,
    presenter: Box<dyn Presenter>,
    annunciator: Box<dyn Annunciator>,
    forecast: Option<Box<dyn ForecastSource>>,
    network: Box<dyn NetworkLink>,

    detector: ChangeDetector,
    led: LedController,
    ntp_timer: IntervalTimer,
    sensor_timer: IntervalTimer,
    forecast_timer: IntervalTimer,
    pending: ChangeReport,
}

impl<T: TimeSource, D: DelayNs> Scheduler<T, D> {
    /// Start building a scheduler from its required collaborators
    pub fn builder(
        time: T,
        delay: D,
        sensors: impl ObservationSource + 'static,
        clock: CivilClock,
    ) -> SchedulerBuilder<T, D> {
        SchedulerBuilder::new(time, delay, Box::new(sensors), clock)
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn clock(&self) -> &CivilClock {
        &self.clock
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Alerts waiting to be shown, with their significance
    pub fn pending(&self) -> &ChangeReport {
        &self.pending
    }

    pub fn significance(&self) -> Significance {
        self.pending.significance
    }

    pub fn is_online(&self) -> bool {
        self.network.is_connected()
    }

    /// Timer of a periodic task; the LED and display run every tick
    pub fn timer(&self, task: Task) -> Option<&IntervalTimer> {
        match task {
            Task::TimeSync => Some(&self.ntp_timer),
            Task::SensorCheck => Some(&self.sensor_timer),
            Task::Forecast => Some(&self.forecast_timer),
            Task::Led | Task::Display => None,
        }
    }

    /// Bring the link up, sync the clock once, and arm the timers
    ///
    /// Returns whether the station is online.
    pub fn start(&mut self) -> bool {
        log_info!("Station starting");
        let online = self.connect();
        let now = self.time.now();

        self.ntp_timer = IntervalTimer::due_at(self.config.ntp_resync_interval(), now);
        if online {
            log_info!("Network up, running initial time sync");
            if self.clock.sync() {
                self.ntp_timer = IntervalTimer::armed(self.config.ntp_resync_interval(), now);
            } else {
                log_warn!("Initial time sync failed, using persisted clock");
            }
        } else {
            log_warn!("Network unavailable, using persisted clock");
        }

        self.sensor_timer = IntervalTimer::armed(self.config.sensor_check_interval(), now);
        self.forecast_timer = IntervalTimer::due_at(self.config.forecast_interval(), now);
        self.led = LedController::new(self.config.blink_interval(), now);

        online
    }

    fn connect(&mut self) -> bool {
        if self.network.is_connected() {
            return true;
        }

        let attempts = self.config.network_attempts;
        for attempt in 1..=attempts {
            match self.network.connect() {
                Ok(()) => {
                    log_info!("Network connected on attempt {}", attempt);
                    return true;
                }
                Err(_err) => {
                    log_warn!("Network attempt {}/{} failed: {}", attempt, attempts, _err);
                    if attempt < attempts {
                        self.pause(self.config.network_retry_delay());
                    }
                }
            }
        }
        false
    }

    /// One pass over every task
    pub fn tick(&mut self) -> TickReport {
        let now = self.time.now();
        let mut report = TickReport::new(now);

        self.run_time_sync(now, &mut report);
        self.run_sensor_check(now, &mut report);
        self.run_led(now, &mut report);
        self.run_display(now, &mut report);

        report.significance = self.pending.significance;
        report
    }

    fn run_time_sync(&mut self, now: Ticks, report: &mut TickReport) {
        // polled first so the due state is latched while offline
        if !self.ntp_timer.poll(now) || !self.network.is_connected() {
            return;
        }

        report.fire(Task::TimeSync);
        log_debug!("Time resync due ({} ms elapsed)", self.ntp_timer.elapsed(now));
        match self.clock.try_sync() {
            Ok(_) => {
                log_info!("Periodic time resync succeeded");
                self.ntp_timer.mark(now);
            }
            Err(err) => report.fail(Task::TimeSync, err),
        }
    }

    fn run_sensor_check(&mut self, now: Ticks, report: &mut TickReport) {
        if !self.sensor_timer.poll(now) {
            return;
        }

        report.fire(Task::SensorCheck);
        match self.sensors.read() {
            Ok(observation) => {
                let changes = self.detector.record(&observation);
                if !changes.is_empty() {
                    log_info!(
                        "Detected {} change(s), significance {}",
                        changes.changes.len(),
                        changes.significance.level()
                    );
                }
                self.pending = changes;
                self.sensor_timer.mark(now);
            }
            Err(err) => {
                self.pending = ChangeReport::empty();
                report.fail(Task::SensorCheck, err);
            }
        }
    }

    fn run_led(&mut self, now: Ticks, report: &mut TickReport) {
        report.fire(Task::Led);
        let level = self.pending.significance;
        if let Err(err) = self.led.apply(now, level, self.annunciator.as_mut()) {
            report.fail(Task::Led, err);
        }
    }

    fn run_display(&mut self, now: Ticks, report: &mut TickReport) {
        report.fire(Task::Display);
        self.rotate(now, report);
    }

    /// Screens in order; a screen that fails is skipped with its dwell
    fn rotate(&mut self, now: Ticks, report: &mut TickReport) {
        match self.sensors.read() {
            Ok(observation) => self.show_readings(&observation, report),
            Err(err) => report.fail(Task::Display, err),
        }

        if self.forecast_due(now) {
            report.fire(Task::Forecast);
            self.show_forecast(now, report);
        }

        let dwell = self.config.reading_dwell();
        for i in 0..self.pending.changes.len() {
            let change = &self.pending.changes[i];
            let drawn = self.presenter.show_alert(&change.label, change.icon());
            self.dwell_if_drawn(drawn, dwell, report);
        }

        match self.clock.now_local() {
            Ok(local) => {
                let drawn = self.presenter.show_clock(&local);
                self.dwell_if_drawn(drawn, self.config.clock_dwell(), report);
            }
            Err(err) => report.fail(Task::Display, err),
        }
    }

    fn show_readings(&mut self, observation: &Observation, report: &mut TickReport) {
        for metric in Metric::ALL {
            let icon = self.reading_icon(metric, observation);
            let text = observation.display_value(metric);
            let drawn = self.presenter.show_reading(metric, icon, &text);
            self.dwell_if_drawn(drawn, self.config.reading_dwell(), report);
        }
    }

    fn reading_icon(&self, metric: Metric, observation: &Observation) -> Icon {
        match (metric, observation.value(metric)) {
            (Metric::Pressure, Some(mmhg)) if !self.config.pressure_is_comfortable(mmhg) => {
                Icon::PressureComfort
            }
            _ => metric.icon(),
        }
    }

    fn forecast_due(&mut self, now: Ticks) -> bool {
        let due = self.forecast_timer.poll(now);
        due && self.forecast.is_some() && self.network.is_connected()
    }

    fn show_forecast(&mut self, now: Ticks, report: &mut TickReport) {
        let Some(source) = self.forecast.as_mut() else {
            return;
        };

        let code = match source.tomorrow_code() {
            Ok(code) => code,
            Err(err) => {
                report.fail(Task::Forecast, err);
                return;
            }
        };

        let forecast = Forecast::from_code(code);
        if !forecast.is_known() {
            log_warn!("Unknown weather code {}", code);
        }

        let drawn = self.presenter.show_forecast(forecast.icon, forecast.description);
        if self.dwell_if_drawn(drawn, self.config.forecast_dwell(), report) {
            self.forecast_timer.mark(now);
        }
    }

    /// Hold a drawn screen for its dwell, or record why it was not drawn
    fn dwell_if_drawn(
        &mut self,
        drawn: StationResult<()>,
        dwell: MillisDurationU32,
        report: &mut TickReport,
    ) -> bool {
        match drawn {
            Ok(()) => {
                self.pause(dwell);
                true
            }
            Err(err) => {
                report.fail(Task::Display, err);
                false
            }
        }
    }

    fn pause(&mut self, duration: MillisDurationU32) {
        self.delay.delay_ms(duration.to_millis());
    }

    /// Sleep between ticks: the normal pause, or the back-off after an
    /// unguarded failure. Returns the pause taken.
    pub fn pace(&mut self, report: &TickReport) -> MillisDurationU32 {
        let pause = if report.needs_backoff() {
            self.config.fault_backoff()
        } else {
            self.config.tick_pause()
        };
        self.pause(pause);
        pause
    }

    /// Start, then tick forever
    pub fn run(&mut self) -> ! {
        self.start();
        loop {
            let report = self.tick();
            self.pace(&report);
        }
    }
}

/// Builder for [`Scheduler`]
///
/// Optional collaborators default to a headless, LED-less, offline station
/// without forecasts.
pub struct SchedulerBuilder<T: TimeSource, D: DelayNs> {
    config: StationConfig,
    time: T,
    delay: D,
    sensors: Box<dyn ObservationSource>,
    clock: CivilClock,
    presenter: Box<dyn Presenter>,
    annunciator: Box<dyn Annunciator>,
    forecast: Option<Box<dyn ForecastSource>>,
    network: Box<dyn NetworkLink>,
}

impl<T: TimeSource, D: DelayNs> SchedulerBuilder<T, D> {
    fn new(time: T, delay: D, sensors: Box<dyn ObservationSource>, clock: CivilClock) -> Self {
        Self {
            config: StationConfig::default(),
            time,
            delay,
            sensors,
            clock,
            presenter: Box::new(NoDisplay),
            annunciator: Box::new(NoAnnunciator),
            forecast: None,
            network: Box::new(Offline),
        }
    }

    pub fn config(mut self, config: StationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    pub fn annunciator(mut self, annunciator: impl Annunciator + 'static) -> Self {
        self.annunciator = Box::new(annunciator);
        self
    }

    pub fn forecast(mut self, source: impl ForecastSource + 'static) -> Self {
        self.forecast = Some(Box::new(source));
        self
    }

    pub fn network(mut self, link: impl NetworkLink + 'static) -> Self {
        self.network = Box::new(link);
        self
    }

    /// Validate the configuration and assemble the scheduler
    ///
    /// The configured DST rule and thresholds replace whatever the clock
    /// and detector were built with.
    pub fn build(self) -> StationResult<Scheduler<T, D>> {
        self.config.validate()?;

        let now = self.time.now();
        let config = self.config;

        Ok(Scheduler {
            detector: ChangeDetector::with_thresholds(config.thresholds),
            led: LedController::new(config.blink_interval(), now),
            ntp_timer: IntervalTimer::due_at(config.ntp_resync_interval(), now),
            sensor_timer: IntervalTimer::armed(config.sensor_check_interval(), now),
            forecast_timer: IntervalTimer::due_at(config.forecast_interval(), now),
            pending: ChangeReport::empty(),
            clock: self.clock.with_rule(config.dst),
            config,
            time: self.time,
            delay: self.delay,
            sensors: self.sensors,
            presenter: self.presenter,
            annunciator: self.annunciator,
            forecast: self.forecast,
            network: self.network,
        })
    }
}
