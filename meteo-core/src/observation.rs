//! Observations: what the sensors reported on one sampling tick
//!
//! Sensor adapters hand the core an [`Observation`], one optional value per
//! [`Metric`]. A value may arrive as a number or as text with the unit glued
//! on (`"21C"`, `"45%"`), which is how the common sensor drivers format
//! them. The core never trusts either form directly: [`clean`] reduces a
//! value to a plain `f32`, and anything that does not survive cleaning is
//! treated exactly like a missing sensor.
//!
//! The cleaned form, [`Snapshot`], is what the change detector keeps in
//! its history.

use core::fmt::Write;

use heapless::String;

use crate::constants::display::MISSING_VALUE;
use crate::constants::thresholds::{HPA_TO_MMHG, PRESSURE_CALIBRATION_MMHG};

/// Capacity of a textual sensor value
pub const VALUE_TEXT_LEN: usize = 16;

/// The fixed set of quantities the station measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Metric {
    OutsideTemperature = 0,
    InsideTemperature = 1,
    Humidity = 2,
    Pressure = 3,
}

impl Metric {
    /// All metrics, in display order
    pub const ALL: [Metric; 4] = [
        Metric::OutsideTemperature,
        Metric::InsideTemperature,
        Metric::Humidity,
        Metric::Pressure,
    ];

    /// Metrics that must be present for change detection
    pub const REQUIRED: [Metric; 3] = [
        Metric::InsideTemperature,
        Metric::Humidity,
        Metric::Pressure,
    ];

    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Metric::OutsideTemperature => "outside temperature",
            Metric::InsideTemperature => "inside temperature",
            Metric::Humidity => "humidity",
            Metric::Pressure => "pressure",
        }
    }

    /// Unit of measurement
    pub const fn unit(&self) -> &'static str {
        match self {
            Metric::OutsideTemperature | Metric::InsideTemperature => "°C",
            Metric::Humidity => "%",
            Metric::Pressure => "mmHg",
        }
    }

    /// Suffix appended when a numeric value is shown on the panel
    pub const fn display_suffix(&self) -> &'static str {
        match self {
            Metric::OutsideTemperature | Metric::InsideTemperature => "C",
            Metric::Humidity => "%",
            // the panel is too narrow for "mmHg"
            Metric::Pressure => "",
        }
    }

    /// Icon shown next to this metric
    pub const fn icon(&self) -> Icon {
        match self {
            Metric::OutsideTemperature => Icon::TemperatureOutside,
            Metric::InsideTemperature => Icon::TemperatureInside,
            Metric::Humidity => Icon::Humidity,
            Metric::Pressure => Icon::Pressure,
        }
    }

    const fn index(&self) -> usize {
        *self as usize
    }
}

/// Bitmap identifiers understood by the presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    TemperatureOutside,
    TemperatureInside,
    Humidity,
    Pressure,
    /// Pressure outside the comfortable band
    PressureComfort,
    /// Forecast bitmap, by name
    Weather(&'static str),
}

impl Icon {
    /// Tag used to look up the bitmap
    pub const fn tag(&self) -> &'static str {
        match self {
            Icon::TemperatureOutside => "temp_out",
            Icon::TemperatureInside => "temp_in",
            Icon::Humidity => "hum",
            Icon::Pressure => "pres",
            Icon::PressureComfort => "pressure_comfort",
            Icon::Weather(name) => name,
        }
    }
}

/// A value as reported by a sensor adapter
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f32),
    /// Text possibly carrying a unit, e.g. `"752 mmHg"`
    Text(String<VALUE_TEXT_LEN>),
}

impl RawValue {
    /// Text value; input longer than the inline capacity is rejected
    pub fn text(s: &str) -> Option<Self> {
        String::try_from(s).ok().map(RawValue::Text)
    }
}

impl From<f32> for RawValue {
    fn from(value: f32) -> Self {
        RawValue::Number(value)
    }
}

/// Reduce a sensor value to a plain number
///
/// Text keeps only digits, `.` and a leading `-`; what remains must parse
/// as a float. Non-finite numbers are rejected.
///
/// ```rust
/// use meteo_core::observation::{clean, RawValue};
///
/// assert_eq!(clean(&RawValue::text("21C").unwrap()), Some(21.0));
/// assert_eq!(clean(&RawValue::text("-3.5 C").unwrap()), Some(-3.5));
/// assert_eq!(clean(&RawValue::text("Temp Error").unwrap()), None);
/// assert_eq!(clean(&RawValue::Number(f32::NAN)), None);
/// ```
pub fn clean(value: &RawValue) -> Option<f32> {
    match value {
        RawValue::Number(v) => v.is_finite().then_some(*v),
        RawValue::Text(text) => clean_text(text),
    }
}

fn clean_text(text: &str) -> Option<f32> {
    let mut digits: String<VALUE_TEXT_LEN> = String::new();

    for c in text.chars() {
        let keep = c.is_ascii_digit() || c == '.' || (c == '-' && digits.is_empty());
        if keep {
            digits.push(c).ok()?;
        }
    }

    digits.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Convert a barometer reading to calibrated mmHg
///
/// The converted value is rounded before the calibration offset is added.
/// A non-finite reading has no pressure; huge ones saturate.
pub fn hpa_to_mmhg(hpa: f32, calibration_mmhg: i32) -> Option<i32> {
    if !hpa.is_finite() {
        return None;
    }
    Some((libm::roundf(hpa * HPA_TO_MMHG) as i32).saturating_add(calibration_mmhg))
}

/// [`hpa_to_mmhg`] with the station board's calibration offset
///
/// ```rust
/// use meteo_core::observation::station_pressure_mmhg;
///
/// assert_eq!(station_pressure_mmhg(1000.0), Some(750 + 33));
/// assert_eq!(station_pressure_mmhg(f32::NAN), None);
/// ```
pub fn station_pressure_mmhg(hpa: f32) -> Option<i32> {
    hpa_to_mmhg(hpa, PRESSURE_CALIBRATION_MMHG)
}

/// Sensor values from one sampling tick
///
/// Each metric is an explicit optional field; a sensor that did not respond
/// contributes `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub outside_temp: Option<RawValue>,
    pub inside_temp: Option<RawValue>,
    pub humidity: Option<RawValue>,
    pub pressure: Option<RawValue>,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, metric: Metric, value: impl Into<RawValue>) -> Self {
        *self.slot_mut(metric) = Some(value.into());
        self
    }

    /// Raw value for a metric
    pub fn get(&self, metric: Metric) -> Option<&RawValue> {
        match metric {
            Metric::OutsideTemperature => self.outside_temp.as_ref(),
            Metric::InsideTemperature => self.inside_temp.as_ref(),
            Metric::Humidity => self.humidity.as_ref(),
            Metric::Pressure => self.pressure.as_ref(),
        }
    }

    /// Cleaned value for a metric
    pub fn value(&self, metric: Metric) -> Option<f32> {
        self.get(metric).and_then(clean)
    }

    /// True when no sensor contributed anything
    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| self.get(*m).is_none())
    }

    /// Text to put on the panel for a metric
    ///
    /// Text values are shown as reported, numbers are rounded and suffixed,
    /// and a missing sensor shows `N/A`.
    pub fn display_value(&self, metric: Metric) -> String<VALUE_TEXT_LEN> {
        let mut out = String::new();
        match self.get(metric) {
            Some(RawValue::Text(text)) => {
                // same capacity, cannot overflow
                let _ = out.push_str(text);
            }
            Some(RawValue::Number(v)) if v.is_finite() => {
                let _ = write!(out, "{}{}", libm::roundf(*v) as i32, metric.display_suffix());
            }
            _ => {
                let _ = out.push_str(MISSING_VALUE);
            }
        }
        out
    }

    fn slot_mut(&mut self, metric: Metric) -> &mut Option<RawValue> {
        match metric {
            Metric::OutsideTemperature => &mut self.outside_temp,
            Metric::InsideTemperature => &mut self.inside_temp,
            Metric::Humidity => &mut self.humidity,
            Metric::Pressure => &mut self.pressure,
        }
    }
}

/// Cleaned observation as stored in the history window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    values: [Option<f32>; 4],
}

impl Snapshot {
    pub fn get(&self, metric: Metric) -> Option<f32> {
        self.values[metric.index()]
    }

    /// True when every metric needed for change detection is present
    pub fn is_complete(&self) -> bool {
        Metric::REQUIRED.iter().all(|m| self.get(*m).is_some())
    }
}

impl From<&Observation> for Snapshot {
    fn from(observation: &Observation) -> Self {
        let mut values = [None; 4];
        for metric in Metric::ALL {
            values[metric.index()] = observation.value(metric);
        }
        Self { values }
    }
}
