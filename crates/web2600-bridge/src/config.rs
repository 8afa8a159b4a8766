use crate::error::ConfigError;
use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODULE_URL: &str = "web2600.wasm";

/// Delay between frames, giving the worker's event loop room to deliver input
pub const DEFAULT_FRAME_INTERVAL_MS: u32 = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    pub module_url: String,
    pub frame_interval_ms: u32,
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            module_url: DEFAULT_MODULE_URL.to_string(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            log_level: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = serde_json::from_str(raw)?;
        config.level_filter()?;
        Ok(config)
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    /// Level for the console logger. `off` still keeps errors, so failed
    /// notifications are always reported somewhere
    pub fn console_level(&self) -> Result<Level, ConfigError> {
        Ok(self.level_filter()?.to_level().unwrap_or(Level::Error))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = BridgeConfig::from_json("{}").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.module_url, "web2600.wasm");
        assert_eq!(config.frame_interval_ms, 25);
    }

    #[test]
    fn test_partial_override() {
        let config = BridgeConfig::from_json(r#"{"moduleUrl":"/roms/vcs.wasm","logLevel":"debug"}"#).unwrap();
        assert_eq!(config.module_url, "/roms/vcs.wasm");
        assert_eq!(config.frame_interval_ms, DEFAULT_FRAME_INTERVAL_MS);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            BridgeConfig::from_json(r#"{"frameIntervalMs":"soon"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            BridgeConfig::from_json(r#"{"logLevel":"chatty"}"#),
            Err(ConfigError::LogLevel(_))
        ));
    }

    #[test]
    fn test_console_level_never_drops_errors() {
        let quiet = BridgeConfig::from_json(r#"{"logLevel":"off"}"#).unwrap();
        assert_eq!(quiet.level_filter().unwrap(), LevelFilter::Off);
        assert_eq!(quiet.console_level().unwrap(), Level::Error);

        assert_eq!(BridgeConfig::default().console_level().unwrap(), Level::Info);
    }
}
