//! JSON configuration files
//!
//! Any field left out of the file keeps its default, so a config can be as
//! small as `{"sensor_check_s": 60}`.

use std::fs;
use std::path::Path;

use meteo_core::config::StationConfig;

use crate::ConnectorError;

/// Parse and validate a station config
pub fn parse_config(json: &str) -> Result<StationConfig, ConnectorError> {
    let config: StationConfig = serde_json::from_str(json)?;
    config
        .validate()
        .map_err(|e| ConnectorError::ConfigError(e.to_string()))?;
    Ok(config)
}

/// Read a station config from a JSON file
pub fn load_config(path: impl AsRef<Path>) -> Result<StationConfig, ConnectorError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let config = parse_config(&json)?;
    log::info!("Loaded station config from {}", path.display());
    Ok(config)
}

/// Write a station config as pretty JSON
pub fn save_config(path: impl AsRef<Path>, config: &StationConfig) -> Result<(), ConnectorError> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}
