//! Mapping of HTTP failures onto `PortError`
//!
//! - 404 -> `PortError::NotFound`
//! - 401/403 -> `PortError::Unauthorized`
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Other non-success statuses -> `PortError::Rejected`
//! - Timeouts -> `PortError::Timeout`
//! - Connection failures -> `PortError::Connection`
//! - Undecodable bodies -> `PortError::Transformation`

use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use core_kernel::PortError;

/// Retry delay assumed when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Error body returned by the service, e.g. `{"message": "Client not found with ID: 9"}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extracts the human-readable message from an error body, if any
///
/// Only `message` is read; `error` holds a status phrase like "Bad Request".
pub fn server_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// What a request was about, for error reporting
#[derive(Debug, Clone)]
pub struct Target {
    pub operation: &'static str,
    pub entity: &'static str,
    pub id: Option<String>,
}

impl Target {
    pub fn new(operation: &'static str, entity: &'static str) -> Self {
        Self {
            operation,
            entity,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl ToString) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

/// Maps a non-success response onto a port error
pub fn status_error(
    target: &Target,
    service: &str,
    status: StatusCode,
    retry_after: Option<u64>,
    body: &[u8],
) -> PortError {
    let message = server_message(body);

    match status {
        StatusCode::NOT_FOUND => {
            PortError::not_found(target.entity, target.id.as_deref().unwrap_or("-"))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized {
            message: message.unwrap_or_else(|| status.to_string()),
        },
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        s if s.is_server_error() => PortError::ServiceUnavailable {
            service: service.to_string(),
            message,
        },
        s => PortError::rejected(s.as_u16(), message),
    }
}

/// Maps a transport-level reqwest failure onto a port error
pub fn transport_error(target: &Target, timeout: Duration, error: reqwest::Error) -> PortError {
    if error.is_timeout() {
        return PortError::Timeout {
            operation: target.operation.to_string(),
            duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };
    }
    if error.is_decode() {
        return PortError::Transformation {
            message: format!("{}: {}", target.operation, error),
        };
    }

    PortError::Connection {
        message: format!("{} failed: {}", target.operation, error),
        source: Some(Box::new(error)),
    }
}

/// Maps a body that does not match the expected shape
pub fn decode_error(target: &Target, error: serde_json::Error) -> PortError {
    PortError::Transformation {
        message: format!("{}: unexpected response body: {}", target.operation, error),
    }
}
