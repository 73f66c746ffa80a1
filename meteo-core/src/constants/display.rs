//! Display and Annunciator Defaults

/// How long each sensor reading stays on screen (seconds).
pub const READING_DWELL_S: u32 = 5;

/// How long the forecast screen stays on (seconds).
pub const FORECAST_DWELL_S: u32 = 7;

/// How long the clock face stays on at the end of a rotation (seconds).
pub const CLOCK_DWELL_S: u32 = 10;

/// Minimum time between forecast fetches (seconds).
pub const FORECAST_INTERVAL_S: u32 = 3600;

/// Blink half-period of the severe alert (milliseconds).
pub const BLINK_INTERVAL_MS: u32 = 500;

/// Pressure considered comfortable (mmHg).
pub const COMFORT_PRESSURE_MMHG: i32 = 755;

/// Allowed deviation around the comfortable pressure (mmHg).
pub const PRESSURE_TOLERANCE_MMHG: i32 = 10;

/// Text shown for a metric whose sensor did not respond.
pub const MISSING_VALUE: &str = "N/A";
