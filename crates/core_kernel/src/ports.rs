//! Port plumbing shared by the domain crates and their adapters
//!
//! ```text
//!   PolicyFormController / ClientForm / CLI commands
//!                      │
//!                      ▼
//!          ClientPort, PolicyPort  (extend DomainPort)
//!             ▲                       ▲
//!             │                       │
//!      mock adapters           CrmApiClient (infra_http)
//! ```
//!
//! Every adapter reports failures as [`PortError`]. Callers decide what the
//! user sees: the service's own text via [`PortError::server_message`], or a
//! generic fallback.

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Failure of a call made through a port
#[derive(Debug, Error)]
pub enum PortError {
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The service refused the request (4xx other than 401/403/404/429)
    #[error("Request rejected with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
    },

    /// 5xx from the service, or the circuit breaker refusing the call
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
        message: Option<String>,
    },

    /// A response body did not have the expected shape
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// A 4xx refusal carrying the service's own message
    pub fn rejected(status: u16, message: Option<String>) -> Self {
        PortError::Rejected { status, message }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// True for failures a retry may clear; these also trip the circuit breaker
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::RateLimited { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// The human-readable text the remote service sent back, if any
    ///
    /// Messages composed by the adapter itself are never returned.
    pub fn server_message(&self) -> Option<&str> {
        let message = match self {
            PortError::Rejected { message, .. } => message.as_deref(),
            PortError::ServiceUnavailable { message, .. } => message.as_deref(),
            _ => None,
        };
        message.map(str::trim).filter(|m| !m.is_empty())
    }
}

/// Marker every port trait extends, so ports can be shared across tasks
pub trait DomainPort: Send + Sync + 'static {}

/// Circuit breaker thresholds for the HTTP adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures before the circuit opens
    pub failure_threshold: u32,
    /// Seconds the circuit stays open before a trial call is let through
    pub reset_timeout_secs: u64,
    /// Successful trial calls needed to close the circuit again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_secs: 30,
            success_threshold: 3,
        }
    }
}

/// Per-call metadata handed from a caller to the adapter
///
/// The adapter sends the correlation id with every request so one user action
/// can be followed across retries and into the service's logs.
#[derive(Debug, Clone, Default)]
pub struct OperationMetadata {
    pub correlation_id: Option<String>,
}

impl OperationMetadata {
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
        }
    }

    /// Metadata with a freshly generated correlation id
    pub fn correlated() -> Self {
        Self::with_correlation_id(Uuid::new_v4().to_string())
    }

    /// Returns the correlation id, generating one when absent
    pub fn correlation_id_or_new(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}
