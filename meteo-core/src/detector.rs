//! Rolling-Window Change Detection
//!
//! ## Overview
//!
//! Individual readings from cheap sensors are noisy; what matters to
//! someone looking at the station is whether conditions have *moved*
//! over the last few hours. The [`ChangeDetector`] keeps a bounded window
//! of cleaned snapshots and, on every new observation, compares it with
//! the oldest snapshot still in the window.
//!
//! ## Algorithm
//!
//! ```text
//! record(obs):
//!   window.push(clean(obs))              evicts oldest when full
//!   obs incomplete        -> empty report
//!   window.len() < 2      -> empty report
//!   baseline incomplete   -> empty report
//!   for metric in [inside temp, humidity, pressure]:
//!       delta = obs[metric] - baseline[metric]
//!       |delta| >= severe   -> (label, icon), level 2
//!       |delta| >= moderate -> (label, icon), level 1
//!   significance = max(levels)
//! ```
//!
//! Partial observations still enter the window so the cadence of the
//! history stays intact, but they never produce an alert: a sensor dropping
//! out must not look like a 750 mmHg pressure swing.
//!
//! ## Thresholds
//!
//! | metric | severe | moderate |
//! |---|---|---|
//! | inside temperature (°C) | 5 | 3 |
//! | humidity (%) | 15 | 10 |
//! | pressure (mmHg) | 10 | 5 |
//!
//! Both tiers are inclusive.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::constants::thresholds::{
    HISTORY_CAPACITY, HUMIDITY_MODERATE_PCT, HUMIDITY_SEVERE_PCT, PRESSURE_MODERATE_MMHG,
    PRESSURE_SEVERE_MMHG, TEMP_MODERATE_C, TEMP_SEVERE_C,
};
use crate::history::HistoryWindow;
use crate::observation::{Icon, Metric, Observation, Snapshot};

/// Capacity of a delta label such as `"+12"`
pub const LABEL_LEN: usize = 8;

/// At most one change per required metric
pub const MAX_CHANGES: usize = Metric::REQUIRED.len();

/// How large an environmental change is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Significance {
    #[default]
    None = 0,
    Moderate = 1,
    Severe = 2,
}

impl Significance {
    /// Numeric level, 0 to 2
    pub const fn level(&self) -> u8 {
        *self as u8
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Significance {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "level {}", self.level())
    }
}

/// Moderate and severe tier for one metric
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierThresholds {
    pub moderate: f32,
    pub severe: f32,
}

impl TierThresholds {
    pub const fn new(moderate: f32, severe: f32) -> Self {
        Self { moderate, severe }
    }

    /// Severe is checked first
    pub fn classify(&self, delta: f32) -> Significance {
        let magnitude = libm::fabsf(delta);
        if magnitude >= self.severe {
            Significance::Severe
        } else if magnitude >= self.moderate {
            Significance::Moderate
        } else {
            Significance::None
        }
    }
}

/// Per-metric thresholds used by the detector
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeThresholds {
    pub inside_temperature: TierThresholds,
    pub humidity: TierThresholds,
    pub pressure: TierThresholds,
}

impl Default for ChangeThresholds {
    fn default() -> Self {
        Self {
            inside_temperature: TierThresholds::new(TEMP_MODERATE_C, TEMP_SEVERE_C),
            humidity: TierThresholds::new(HUMIDITY_MODERATE_PCT, HUMIDITY_SEVERE_PCT),
            pressure: TierThresholds::new(PRESSURE_MODERATE_MMHG, PRESSURE_SEVERE_MMHG),
        }
    }
}

impl ChangeThresholds {
    /// Thresholds for a required metric; outside temperature is never
    /// evaluated and has none.
    pub fn for_metric(&self, metric: Metric) -> Option<TierThresholds> {
        match metric {
            Metric::InsideTemperature => Some(self.inside_temperature),
            Metric::Humidity => Some(self.humidity),
            Metric::Pressure => Some(self.pressure),
            Metric::OutsideTemperature => None,
        }
    }
}

/// One metric that crossed a threshold
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub metric: Metric,
    /// Raw delta, current minus baseline
    pub delta: f32,
    /// Rounded delta with explicit sign, e.g. `"+6"`
    pub label: String<LABEL_LEN>,
    pub significance: Significance,
}

impl Change {
    pub fn icon(&self) -> Icon {
        self.metric.icon()
    }
}

/// Result of one detection cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeReport {
    pub changes: Vec<Change, MAX_CHANGES>,
    pub significance: Significance,
}

impl ChangeReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// `(label, icon tag)` pairs in report order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.changes.iter().map(|c| (c.label.as_str(), c.icon().tag()))
    }
}

/// Format a delta as a signed integer, rounding half to even
pub fn delta_label(delta: f32) -> String<LABEL_LEN> {
    let mut label = String::new();
    let rounded = libm::rintf(delta) as i32;
    // i32 with sign fits in LABEL_LEN only up to 7 digits; deltas are far smaller
    let _ = write!(label, "{:+}", rounded);
    label
}

/// Bounded-history change detector
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    window: HistoryWindow<Snapshot, HISTORY_CAPACITY>,
    thresholds: ChangeThresholds,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::with_thresholds(ChangeThresholds::default())
    }

    pub fn with_thresholds(thresholds: ChangeThresholds) -> Self {
        Self {
            window: HistoryWindow::new(),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &ChangeThresholds {
        &self.thresholds
    }

    pub fn history(&self) -> &HistoryWindow<Snapshot, HISTORY_CAPACITY> {
        &self.window
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Add an observation and classify the change against the baseline
    pub fn record(&mut self, observation: &Observation) -> ChangeReport {
        let current = Snapshot::from(observation);
        self.window.push(current);

        if !current.is_complete() {
            log_warn!("Incomplete observation, skipping change detection");
            return ChangeReport::empty();
        }

        if self.window.len() < 2 {
            return ChangeReport::empty();
        }

        let baseline = match self.window.oldest() {
            Some(baseline) if baseline.is_complete() => *baseline,
            _ => {
                log_warn!("Baseline observation incomplete, skipping change detection");
                return ChangeReport::empty();
            }
        };

        self.classify(&baseline, &current)
    }

    fn classify(&self, baseline: &Snapshot, current: &Snapshot) -> ChangeReport {
        let mut report = ChangeReport::empty();

        for metric in Metric::REQUIRED {
            let (Some(now), Some(then), Some(tiers)) = (
                current.get(metric),
                baseline.get(metric),
                self.thresholds.for_metric(metric),
            ) else {
                return ChangeReport::empty();
            };

            let delta = now - then;
            log_debug!("{} delta: {:.1} {}", metric.name(), delta, metric.unit());

            let significance = tiers.classify(delta);
            if significance == Significance::None {
                continue;
            }

            // MAX_CHANGES matches Metric::REQUIRED, push can't fail
            let _ = report.changes.push(Change {
                metric,
                delta,
                label: delta_label(delta),
                significance,
            });
            report.significance = report.significance.max(significance);
        }

        if !report.is_empty() {
            log_info!(
                "Change detected, significance {}",
                report.significance.level()
            );
        }

        report
    }
}
