//! Adapter configuration
//!
//! Read from `CRM_`-prefixed environment variables, falling back to the
//! defaults below for anything unset.
//!
//! | Variable | Default |
//! |---|---|
//! | `CRM_BASE_URL` | `http://localhost:8080/api` |
//! | `CRM_TIMEOUT_SECS` | `30` |
//! | `CRM_RETRY_ATTEMPTS` | `2` |
//! | `CRM_RETRY_BACKOFF_MS` | `200` |
//! | `CRM_CIRCUIT_BREAKER_ENABLED` | `true` |
//! | `CRM_FAILURE_THRESHOLD` | `5` |
//! | `CRM_RESET_TIMEOUT_SECS` | `30` |
//! | `CRM_SUCCESS_THRESHOLD` | `3` |

use serde::Deserialize;
use std::time::Duration;

use core_kernel::{CircuitBreakerConfig, CoreError};

/// Environment prefix for every adapter setting
pub const ENV_PREFIX: &str = "CRM";

/// Default location of the CRM REST service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Configuration for the CRM HTTP adapter
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiClientConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    /// Timeout applied to reads and premium estimates
    pub timeout_secs: u64,
    /// Extra attempts for failed reads; writes are never retried
    pub retry_attempts: u32,
    /// Delay before the first retry, doubled for each further one
    pub retry_backoff_ms: u64,
    /// Name reported in `ServiceUnavailable` errors
    pub service_name: String,
    pub circuit_breaker_enabled: bool,
    pub failure_threshold: u32,
    pub reset_timeout_secs: u64,
    pub success_threshold: u32,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        let breaker = CircuitBreakerConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            retry_attempts: 2,
            retry_backoff_ms: 200,
            service_name: "insurance-crm".to_string(),
            circuit_breaker_enabled: true,
            failure_threshold: breaker.failure_threshold,
            reset_timeout_secs: breaker.reset_timeout_secs,
            success_threshold: breaker.success_threshold,
        }
    }
}

impl ApiClientConfig {
    /// Configuration pointing at `base_url`, everything else default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Loads configuration from `CRM_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads configuration from an explicit environment source
    pub fn from_source(source: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(source.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Checks that the configuration can produce a working client
    pub fn validate(&self) -> Result<(), CoreError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            CoreError::configuration(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::configuration(format!(
                "Unsupported base URL scheme: {}",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::configuration("Timeout must be at least one second"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `attempt` (1-based), capped at ten seconds
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor).min(10_000))
    }

    /// Circuit breaker settings, if the breaker is enabled
    pub fn circuit_breaker(&self) -> Option<CircuitBreakerConfig> {
        self.circuit_breaker_enabled.then(|| CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            reset_timeout_secs: self.reset_timeout_secs,
            success_threshold: self.success_threshold,
        })
    }
}
