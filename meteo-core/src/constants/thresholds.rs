//! Change-Detection Constants
//!
//! The window holds 36 snapshots; at the default five-minute check cadence
//! that is three hours of history, which is the horizon over which a
//! pressure swing of 5-10 mmHg is meaningful for local weather.

/// Number of snapshots retained by the change detector.
pub const HISTORY_CAPACITY: usize = 36;

/// Inside temperature change for a moderate alert (°C).
pub const TEMP_MODERATE_C: f32 = 3.0;

/// Inside temperature change for a severe alert (°C).
pub const TEMP_SEVERE_C: f32 = 5.0;

/// Humidity change for a moderate alert (percentage points).
pub const HUMIDITY_MODERATE_PCT: f32 = 10.0;

/// Humidity change for a severe alert (percentage points).
pub const HUMIDITY_SEVERE_PCT: f32 = 15.0;

/// Pressure change for a moderate alert (mmHg).
pub const PRESSURE_MODERATE_MMHG: f32 = 5.0;

/// Pressure change for a severe alert (mmHg).
pub const PRESSURE_SEVERE_MMHG: f32 = 10.0;

/// hPa to mmHg conversion factor.
pub const HPA_TO_MMHG: f32 = 0.750_061_7;

/// Calibration offset added to the converted pressure (mmHg).
///
/// The BME280 on the station board reads low against the local
/// meteorological service; 33 mmHg brings it to sea-level equivalent.
pub const PRESSURE_CALIBRATION_MMHG: i32 = 33;
