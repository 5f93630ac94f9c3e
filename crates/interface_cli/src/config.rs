//! CLI configuration

use serde::Deserialize;

use infra_http::{ApiClientConfig, ENV_PREFIX};

/// Logging settings, read from the same `CRM_*` variables as the adapter
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct LoggingSettings {
    log_level: String,
    log_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_json: false,
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Default filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines instead of text
    pub log_json: bool,
    /// CRM service adapter settings
    pub api: ApiClientConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let logging = LoggingSettings::default();
        Self {
            log_level: logging.log_level,
            log_json: logging.log_json,
            api: ApiClientConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads configuration from an explicit environment source
    pub fn from_source(source: config::Environment) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(source.try_parsing(true))
            .build()?;

        let logging: LoggingSettings = settings.clone().try_deserialize()?;
        let api: ApiClientConfig = settings.try_deserialize()?;

        Ok(Self {
            log_level: logging.log_level,
            log_json: logging.log_json,
            api,
        })
    }
}
