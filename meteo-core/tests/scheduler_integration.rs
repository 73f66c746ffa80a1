//! Integration tests for the station loop
//!
//! Drives a full scheduler against mock collaborators and simulated time:
//! - Inclusive, wrap-safe timer boundaries
//! - Change detection to LED and alert screens
//! - Fault isolation and pacing
//! - Offline operation and failed resyncs
//! - Forecast cadence and screen order

mod common;

use meteo_core::detector::Significance;
use meteo_core::led::{IDLE_COLOR, MODERATE_COLOR, SEVERE_COLOR};
use meteo_core::observation::Metric;
use meteo_core::scheduler::Task;
use meteo_core::time::TimeSource;
use meteo_core::traits::Rgb;
use meteo_core::{StationConfig, StationError};

use common::scenarios::{self, utc};
use common::{instant_config, Rig, Screen};

fn fast_checks() -> StationConfig {
    instant_config().with_sensor_check_s(1)
}

#[test]
fn sensor_check_fires_at_exact_interval() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(instant_config().with_sensor_check_s(300), false);
    station.start();

    rig.time.set(299_999);
    assert!(!station.tick().ran(Task::SensorCheck));

    rig.time.set(300_000);
    assert!(station.tick().ran(Task::SensorCheck));

    rig.time.set(300_001);
    assert!(!station.tick().ran(Task::SensorCheck));
}

#[test]
fn sensor_check_survives_counter_wrap() {
    let rig = Rig::new(u32::MAX - 500);
    let mut station = rig.scheduler(fast_checks(), false);
    station.start();

    rig.time.advance(999);
    assert!(!station.tick().ran(Task::SensorCheck));

    rig.time.advance(1);
    assert!(station.tick().ran(Task::SensorCheck));
}

#[test]
fn severe_change_raises_alert_and_blinks_red() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(fast_checks(), false);
    station.start();

    rig.time.set(1_000);
    let first = station.tick();
    assert_eq!(first.significance, Significance::None);
    assert_eq!(rig.led.last(), Some(IDLE_COLOR));
    rig.screens.take();

    rig.sensors.set(scenarios::warmer(6.0));
    rig.time.set(2_000);
    let report = station.tick();

    assert_eq!(report.significance, Significance::Severe);
    assert_eq!(rig.led.last(), Some(SEVERE_COLOR));

    let screens = rig.screens.take();
    let alert_at = screens.iter().position(Screen::is_alert).expect("alert shown");
    assert_eq!(
        screens[alert_at],
        Screen::alert("+6", "temp_in")
    );
    // after the four readings, before the clock
    assert_eq!(alert_at, 4);
    assert!(screens[alert_at + 1].is_clock());

    // blink half-period is 500 ms
    rig.time.set(2_200);
    station.tick();
    assert_eq!(rig.led.last(), Some(SEVERE_COLOR));

    rig.time.set(2_500);
    station.tick();
    assert_eq!(rig.led.last(), Some(Rgb::OFF));
}

#[test]
fn moderate_change_holds_steady_blue() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(fast_checks(), false);
    station.start();

    rig.time.set(1_000);
    station.tick();

    rig.sensors.set(scenarios::warmer(4.0));
    rig.time.set(2_000);
    assert_eq!(station.tick().significance, Significance::Moderate);
    assert_eq!(rig.led.last(), Some(MODERATE_COLOR));

    // re-sent on every tick, not only on change
    let writes = rig.led.count();
    rig.time.set(2_100);
    station.tick();
    assert_eq!(rig.led.count(), writes + 1);
    assert_eq!(rig.led.last(), Some(MODERATE_COLOR));
}

#[test]
fn led_returns_to_idle_when_level_drops() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(fast_checks(), false);
    station.start();

    rig.time.set(1_000);
    station.tick();
    rig.sensors.set(scenarios::warmer(6.0));
    rig.time.set(2_000);
    station.tick();

    rig.sensors.set(scenarios::calm());
    rig.time.set(3_000);
    let report = station.tick();

    assert_eq!(report.significance, Significance::None);
    assert_eq!(rig.led.last(), Some(IDLE_COLOR));
    assert!(station.pending().is_empty());
}

#[test]
fn sensor_failure_clears_alerts_at_normal_pace() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(fast_checks().with_pacing_s(1, 5), false);
    station.start();

    rig.time.set(1_000);
    station.tick();
    rig.sensors.set(scenarios::warmer(6.0));
    rig.time.set(2_000);
    station.tick();
    assert_eq!(station.significance(), Significance::Severe);
    rig.screens.take();

    rig.sensors.fail();
    rig.time.set(3_000);
    let report = station.tick();

    assert_eq!(
        report.failure(Task::SensorCheck),
        Some(StationError::SensorUnavailable { sensor: "i2c" })
    );
    assert_eq!(report.significance, Significance::None);
    assert_eq!(rig.led.last(), Some(IDLE_COLOR));

    // later tasks still ran: no readings, no alerts, but the clock
    let screens = rig.screens.take();
    assert_eq!(screens, vec![Screen::clock(12, 0)]);

    // a silent sensor is an expected condition, not a fault
    assert!(!report.needs_backoff());
    let before = rig.time.now();
    assert_eq!(station.pace(&report).to_millis(), 1_000);
    assert_eq!(rig.time.now(), before + 1_000);

    // not re-armed, so the next tick retries
    rig.sensors.set(scenarios::calm());
    let retry = station.tick();
    assert!(retry.ran(Task::SensorCheck));
    assert!(retry.is_clean());
}

#[test]
fn presenter_failure_skips_only_that_screen() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(fast_checks(), false);
    station.start();

    rig.screens.fail_on(Some("reading"));
    rig.time.set(1_000);
    let report = station.tick();

    assert_eq!(
        report.failure(Task::Display),
        Some(StationError::PresentationFailed { screen: "reading" })
    );
    assert_eq!(rig.screens.take(), vec![Screen::clock(12, 0)]);
    assert!(!report.needs_backoff());

    // tasks before the display were unaffected
    assert!(report.ran(Task::SensorCheck));
    assert!(report.failure(Task::SensorCheck).is_none());
    assert_eq!(rig.led.last(), Some(IDLE_COLOR));

    rig.screens.fail_on(Some("clock"));
    rig.time.set(1_500);
    let report = station.tick();
    assert_eq!(rig.screens.take().len(), 4);
    assert_eq!(
        report.failure(Task::Display),
        Some(StationError::PresentationFailed { screen: "clock" })
    );
}

#[test]
fn broken_alert_screen_still_shows_clock() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(fast_checks().with_pacing_s(1, 5), false);
    station.start();

    rig.time.set(1_000);
    station.tick();
    rig.screens.take();

    rig.sensors.set(scenarios::warmer(6.0));
    rig.screens.fail_on(Some("alert"));
    rig.time.set(2_000);
    let report = station.tick();

    assert_eq!(report.significance, Significance::Severe);
    assert_eq!(
        report.failure(Task::Display),
        Some(StationError::PresentationFailed { screen: "alert" })
    );

    let screens = rig.screens.take();
    assert_eq!(screens.len(), 5);
    assert!(!screens.iter().any(Screen::is_alert));
    assert!(screens[4].is_clock());

    assert_eq!(station.pace(&report).to_millis(), 1_000);
}

#[test]
fn network_timeout_keeps_normal_pacing() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(instant_config().with_pacing_s(1, 5), true);
    station.start();

    let report = station.tick();
    assert!(report.ran(Task::TimeSync));
    assert_eq!(report.failure(Task::TimeSync), Some(StationError::NetworkTimeout));
    assert!(!report.needs_backoff());
    assert_eq!(station.pace(&report).to_millis(), 1_000);
}

#[test]
fn offline_station_skips_resync_and_forecast() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(instant_config(), false);
    assert!(!station.start());

    for hour in 1..=3 {
        rig.time.set(hour * 3_600_000);
        let report = station.tick();
        assert!(!report.ran(Task::TimeSync));
        assert!(!report.ran(Task::Forecast));
    }

    assert_eq!(rig.ntp.calls(), 0);
    assert_eq!(rig.forecast.calls(), 0);
    assert!(!station.is_online());
}

#[test]
fn failed_resync_keeps_clock_and_retries() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(instant_config(), true);

    // initial sync times out
    assert!(station.start());
    assert_eq!(rig.ntp.calls(), 1);
    assert_eq!(rig.rtc.writes(), 0);
    assert_eq!(rig.rtc.current(), Some(scenarios::noon()));
    assert!(station.clock().state().last_sync_utc.is_none());

    let report = station.tick();
    assert!(report.ran(Task::TimeSync));
    assert_eq!(report.failure(Task::TimeSync), Some(StationError::NetworkTimeout));
    assert!(rig.screens.take().contains(&Screen::clock(12, 0)));

    // still due, so tried again on the very next tick
    rig.time.set(1);
    assert!(station.tick().ran(Task::TimeSync));
    assert_eq!(rig.ntp.calls(), 3);

    // 09:30 UTC in July is 12:30 local summer time
    rig.ntp.reply(utc(2025, 7, 1, 9, 30, 0));
    rig.time.set(2);
    let report = station.tick();
    assert!(report.failure(Task::TimeSync).is_none());
    assert_eq!(rig.rtc.writes(), 1);
    let local = rig.rtc.current().expect("clock written");
    assert_eq!((local.hour, local.minute), (12, 30));

    rig.time.set(3);
    assert!(!station.tick().ran(Task::TimeSync));
}

#[test]
fn failing_resync_stays_due_across_counter_wrap() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(instant_config(), true);
    station.start();
    assert!(station.tick().ran(Task::TimeSync));

    // one counter cycle after the resync first fell due, the raw
    // difference reads as only a minute
    let wrapped = 0u32.wrapping_sub(604_800_000).wrapping_add(60_000);
    rig.time.set(wrapped);
    assert!(station.tick().ran(Task::TimeSync));

    rig.ntp.reply(utc(2025, 7, 1, 9, 30, 0));
    rig.time.set(wrapped + 1);
    assert!(station.tick().failure(Task::TimeSync).is_none());

    rig.time.set(wrapped + 2);
    assert!(!station.tick().ran(Task::TimeSync));
}

#[test]
fn resync_fires_weekly_after_successful_start() {
    let rig = Rig::new(0);
    rig.ntp.reply(utc(2025, 1, 15, 10, 0, 0));
    let mut station = rig.scheduler(instant_config(), true);

    assert!(station.start());
    assert_eq!(rig.rtc.writes(), 1);

    rig.time.set(604_800_000 - 1);
    assert!(!station.tick().ran(Task::TimeSync));

    rig.ntp.reply(utc(2025, 1, 22, 10, 0, 0));
    rig.time.set(604_800_000);
    let report = station.tick();
    assert!(report.ran(Task::TimeSync));
    assert!(report.failure(Task::TimeSync).is_none());
    assert_eq!(rig.rtc.writes(), 2);
}

#[test]
fn forecast_shown_once_per_interval() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(instant_config(), true);
    station.start();
    rig.screens.take();

    let report = station.tick();
    assert!(report.ran(Task::Forecast));
    let screens = rig.screens.take();
    assert_eq!(
        screens[4],
        Screen::forecast("drizzle", "Slight rain")
    );
    assert!(screens[5].is_clock());

    rig.time.set(1_000);
    assert!(!station.tick().ran(Task::Forecast));
    assert_eq!(rig.forecast.calls(), 1);

    rig.time.set(3_600_000);
    assert!(station.tick().ran(Task::Forecast));
    assert_eq!(rig.forecast.calls(), 2);
}

#[test]
fn forecast_failure_retries_next_tick() {
    let rig = Rig::new(0);
    rig.forecast.set(None);
    let mut station = rig.scheduler(instant_config(), true);
    station.start();
    rig.screens.take();

    let report = station.tick();
    assert_eq!(report.failure(Task::Forecast), Some(StationError::ForecastUnavailable));
    // the rest of the rotation still ran
    let screens = rig.screens.take();
    assert!(screens.iter().all(|s| !matches!(s, Screen::Forecast { .. })));
    assert!(screens.last().is_some_and(Screen::is_clock));

    rig.forecast.set(Some(95));
    rig.time.set(1);
    let report = station.tick();
    assert!(report.failure(Task::Forecast).is_none());
    let storm = Screen::forecast("showers-violent", "Slight or moderate thunderstorm");
    assert!(rig.screens.take().contains(&storm));
}

#[test]
fn unknown_weather_code_still_rendered() {
    let rig = Rig::new(0);
    rig.forecast.set(Some(42));
    let mut station = rig.scheduler(instant_config(), true);
    station.start();

    station.tick();
    assert!(rig.screens.take().contains(&Screen::forecast("unknown", "Unknown")));
}

#[test]
fn pressure_outside_comfort_band_uses_comfort_icon() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(instant_config(), false);
    station.start();

    rig.sensors.set(scenarios::reading(10.0, 20.0, 40.0, 770.0));
    station.tick();
    let screens = rig.screens.take();
    assert_eq!(
        screens[3],
        Screen::reading(Metric::Pressure, "pressure_comfort", "770")
    );

    rig.sensors.set(scenarios::calm_as_text());
    station.tick();
    let screens = rig.screens.take();
    assert_eq!(
        screens[3],
        Screen::reading(Metric::Pressure, "pres", "750")
    );
}

#[test]
fn missing_sensor_shows_placeholder() {
    let rig = Rig::new(0);
    rig.sensors.set(scenarios::without_humidity());
    let mut station = rig.scheduler(instant_config(), false);
    station.start();

    station.tick();
    let screens = rig.screens.take();
    assert_eq!(
        screens[..3],
        [
            Screen::reading(Metric::OutsideTemperature, "temp_out", "10C"),
            Screen::reading(Metric::InsideTemperature, "temp_in", "20C"),
            Screen::reading(Metric::Humidity, "hum", "N/A"),
        ]
    );
}

#[test]
fn partial_observations_never_alert() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(fast_checks(), false);
    station.start();

    rig.time.set(1_000);
    station.tick();

    let mut hot = scenarios::warmer(10.0);
    hot.humidity = None;
    rig.sensors.set(hot);
    rig.time.set(2_000);
    let report = station.tick();

    assert_eq!(report.significance, Significance::None);
    assert_eq!(station.detector().history().len(), 2);
}

#[test]
fn dwell_times_pace_the_rotation() {
    let rig = Rig::new(0);
    let config = StationConfig::default().with_network_retries(1, 0);
    let mut station = rig.scheduler(config, false);
    station.start();
    assert_eq!(rig.time.now(), 0);

    station.tick();
    // four readings at 5 s, clock face at 10 s
    assert_eq!(rig.time.now(), 30_000);
}

#[test]
fn clock_falls_back_to_last_resolved_time() {
    let rig = Rig::new(0);
    let mut station = rig.scheduler(instant_config(), false);
    station.start();

    station.tick();
    rig.screens.take();

    rig.rtc.break_reads();
    rig.time.set(1);
    let report = station.tick();

    assert!(report.is_clean());
    assert!(rig.screens.take().contains(&Screen::clock(12, 0)));
}
