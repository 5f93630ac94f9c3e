//! Client domain errors

use thiserror::Error;

use core_kernel::PortError;
use crate::validation::ClientValidationReport;

/// Shown when the service gives no usable message for a failed creation
pub const CREATE_CLIENT_FAILED_MESSAGE: &str = "Failed to create client";

/// Shown when a created client comes back without an id
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server";

/// Errors that can occur while driving the add-client form
#[derive(Debug, Error)]
pub enum ClientFormError {
    /// Field name does not belong to the client form
    #[error("Unknown client field: {0}")]
    UnknownField(String),

    /// Draft failed client-side validation; nothing was sent
    #[error("{}", .0.summary().unwrap_or_else(|| "Validation failed".to_string()))]
    Validation(ClientValidationReport),

    /// The service accepted the request but returned no client id
    #[error("Invalid response from server")]
    InvalidResponse,

    /// The client service failed; `message` is what the user sees
    #[error("{message}")]
    Service {
        message: String,
        #[source]
        source: PortError,
    },
}

impl ClientFormError {
    /// Wraps a port failure, preferring the service's own wording
    pub fn service(source: PortError) -> Self {
        let message = source
            .server_message()
            .unwrap_or(CREATE_CLIENT_FAILED_MESSAGE)
            .to_string();
        ClientFormError::Service { message, source }
    }

    /// Returns the message to display to the user
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
