//! Open-Meteo forecast client
//!
//! Asks the free Open-Meteo API for a two-day daily forecast and keeps
//! tomorrow's WMO weather code (`daily.weather_code[1]`). Mapping the code
//! to an icon and text is done by the core.
//!
//! Response parsing is always compiled so it can be tested without the
//! `http` feature; the client itself needs `ureq`.

use serde::Deserialize;

use crate::ConnectorError;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<Daily>,
}

#[derive(Debug, Deserialize)]
struct Daily {
    #[serde(default)]
    weather_code: Vec<Option<u8>>,
}

/// Tomorrow's weather code from an Open-Meteo JSON body
pub fn parse_tomorrow_code(body: &str) -> Result<u8, ConnectorError> {
    let response: ForecastResponse = serde_json::from_str(body)?;
    response
        .daily
        .and_then(|daily| daily.weather_code.get(1).copied().flatten())
        .ok_or(ConnectorError::NoForecast)
}

#[cfg(feature = "http")]
pub use self::client::{OpenMeteoClient, OpenMeteoConfig};

#[cfg(feature = "http")]
mod client {
    use std::time::Duration;

    use meteo_core::traits::ForecastSource;
    use meteo_core::StationResult;

    use super::{parse_tomorrow_code, DEFAULT_ENDPOINT};
    use crate::ConnectorError;

    /// Location and transport settings
    #[derive(Debug, Clone)]
    pub struct OpenMeteoConfig {
        pub endpoint: String,
        pub latitude: f64,
        pub longitude: f64,
        /// IANA zone used to cut the daily buckets
        pub timezone: String,
        pub timeout: Duration,
    }

    impl OpenMeteoConfig {
        pub fn new(latitude: f64, longitude: f64) -> Self {
            Self {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                latitude,
                longitude,
                timezone: "Europe/Kyiv".to_string(),
                timeout: Duration::from_secs(10),
            }
        }

        pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
            self.endpoint = endpoint.into();
            self
        }

        pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
            self.timezone = timezone.into();
            self
        }

        pub fn timeout_secs(mut self, secs: u64) -> Self {
            self.timeout = Duration::from_secs(secs);
            self
        }
    }

    /// Forecast client using the lightweight ureq agent
    pub struct OpenMeteoClient {
        config: OpenMeteoConfig,
        agent: ureq::Agent,
    }

    impl OpenMeteoClient {
        pub fn new(config: OpenMeteoConfig) -> Result<Self, ConnectorError> {
            if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
                return Err(ConnectorError::ConfigError(
                    "endpoint must start with http:// or https://".into(),
                ));
            }

            let agent = ureq::AgentBuilder::new()
                .timeout(config.timeout)
                .user_agent(&format!("meteo/{}", env!("CARGO_PKG_VERSION")))
                .build();

            Ok(Self { config, agent })
        }

        /// Fetch and parse tomorrow's code
        pub fn fetch(&self) -> Result<u8, ConnectorError> {
            let response = self
                .agent
                .get(&self.config.endpoint)
                .query("latitude", &self.config.latitude.to_string())
                .query("longitude", &self.config.longitude.to_string())
                .query("daily", "weather_code")
                .query("forecast_days", "2")
                .query("timezone", &self.config.timezone)
                .call();

            match response {
                Ok(resp) => {
                    let body = resp
                        .into_string()
                        .map_err(|e| ConnectorError::Http(e.to_string()))?;
                    parse_tomorrow_code(&body)
                }
                Err(ureq::Error::Status(status, _)) => Err(ConnectorError::ServerError { status }),
                Err(ureq::Error::Transport(e)) => Err(ConnectorError::Http(e.to_string())),
            }
        }
    }

    impl ForecastSource for OpenMeteoClient {
        fn tomorrow_code(&mut self) -> StationResult<u8> {
            self.fetch().map_err(|err| {
                log::warn!("Forecast request failed: {}", err);
                err.into()
            })
        }
    }

}
