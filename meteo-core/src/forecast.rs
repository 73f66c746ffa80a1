//! WMO Weather Code Tables
//!
//! The forecast service reports tomorrow's weather as a WMO 4677 code
//! (the subset used by Open-Meteo). The display needs two things from it: a
//! bitmap name and a short description.
//!
//! ## Table Design
//!
//! One static table sorted by code, looked up with a binary search. 28
//! entries fit in well under half a kilobyte of flash, and codes the table
//! doesn't know map to [`UNKNOWN_ICON`] / [`UNKNOWN_DESCRIPTION`] rather
//! than failing.
//!
//! ```rust
//! use meteo_core::forecast::{describe, icon_name};
//!
//! assert_eq!(icon_name(3), "overcast");
//! assert_eq!(describe(95), "Slight or moderate thunderstorm");
//! assert_eq!(icon_name(42), "unknown");
//! ```

use crate::observation::Icon;

/// Bitmap name for codes missing from the table
pub const UNKNOWN_ICON: &str = "unknown";

/// Description for codes missing from the table
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// (code, bitmap name, description), sorted by code
const WEATHER_CODES: [(u8, &str, &str); 28] = [
    (0, "sun", "Clear sky"),
    (1, "sun", "Mainly clear"),
    (2, "clouds", "Partly cloudy"),
    (3, "overcast", "Overcast"),
    (45, "fog", "Fog"),
    (48, "fog", "Depositing rime fog"),
    (51, "drizzle", "Light drizzle"),
    (53, "drizzle", "Moderate drizzle"),
    (55, "drizzle", "Dense drizzle"),
    (56, "snow", "Light freezing drizzle"),
    (57, "snow", "Dense freezing drizzle"),
    (61, "drizzle", "Slight rain"),
    (63, "drizzle", "Moderate rain"),
    (65, "rain", "Heavy rain"),
    (66, "rain", "Light freezing rain"),
    (67, "rain", "Heavy freezing rain"),
    (71, "snow", "Slight snow fall"),
    (73, "snow", "Moderate snow fall"),
    (75, "snow", "Heavy snow fall"),
    (77, "drizzle", "Snow grains"),
    (80, "drizzle", "Slight rain showers"),
    (81, "drizzle", "Moderate rain showers"),
    (82, "showers-violent", "Violent rain showers"),
    (85, "snow", "Slight snow showers"),
    (86, "snow", "Heavy snow showers"),
    (95, "showers-violent", "Slight or moderate thunderstorm"),
    (96, "showers-violent", "Thunderstorm with slight hail"),
    (99, "showers-violent", "Thunderstorm with heavy hail"),
];

fn lookup(code: u8) -> Option<&'static (u8, &'static str, &'static str)> {
    WEATHER_CODES
        .binary_search_by_key(&code, |(c, _, _)| *c)
        .ok()
        .map(|idx| &WEATHER_CODES[idx])
}

/// Bitmap name for a weather code
pub fn icon_name(code: u8) -> &'static str {
    lookup(code).map_or(UNKNOWN_ICON, |(_, icon, _)| icon)
}

/// Human-readable description of a weather code
pub fn describe(code: u8) -> &'static str {
    lookup(code).map_or(UNKNOWN_DESCRIPTION, |(_, _, text)| text)
}

/// Everything the forecast screen needs for one code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forecast {
    pub code: u8,
    pub icon: Icon,
    pub description: &'static str,
}

impl Forecast {
    pub fn from_code(code: u8) -> Self {
        Self {
            code,
            icon: Icon::Weather(icon_name(code)),
            description: describe(code),
        }
    }

    /// False when the code is not in the table
    pub fn is_known(&self) -> bool {
        lookup(self.code).is_some()
    }
}
