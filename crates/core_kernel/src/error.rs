//! Core error types used across the system

use thiserror::Error;
use crate::identifiers::ParseIdError;

/// Errors raised while setting up shared infrastructure
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Identifier error: {0}")]
    Identifier(#[from] ParseIdError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}
