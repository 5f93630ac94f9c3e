//! Policy domain errors
//!
//! This module defines the error types raised while editing, validating,
//! and submitting a new policy.

use thiserror::Error;

use core_kernel::PortError;
use crate::validation::ValidationReport;

/// Shown when the service gives no usable message for a failed creation
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create policy. Please try again.";

/// Shown when the service gives no usable message for a failed estimate
pub const ESTIMATE_FAILED_MESSAGE: &str = "Failed to calculate premium. Please try again.";

/// Errors that can occur while driving the new-policy form
#[derive(Debug, Error)]
pub enum PolicyFormError {
    /// Field name does not belong to the policy form
    #[error("Unknown policy field: {0}")]
    UnknownField(String),

    /// Policy type token is not one of the offered products
    #[error("Unknown policy type: {0}")]
    UnknownPolicyType(String),

    /// Route parameter does not identify a client
    #[error("Invalid client ID")]
    InvalidClientId(String),

    /// Draft failed client-side validation; nothing was sent
    #[error("{0}")]
    Validation(ValidationReport),

    /// A submission is already waiting on the service
    #[error("Policy submission already in progress")]
    SubmissionInProgress,

    /// The policy service failed; `message` is what the user sees
    #[error("{message}")]
    Service {
        message: String,
        #[source]
        source: PortError,
    },
}

impl PolicyFormError {
    /// Wraps a port failure, preferring the service's own wording
    pub fn service(source: PortError, fallback: &str) -> Self {
        let message = source
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        PolicyFormError::Service { message, source }
    }

    /// Returns the message to display to the user
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
