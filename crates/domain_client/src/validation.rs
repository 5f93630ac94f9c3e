//! Add-client validation rules
//!
//! # Validation Rules
//!
//! - First name, last name, email, and date of birth are required
//! - Email must look like an address
//! - Date of birth must be a `YYYY-MM-DD` date in the past

use chrono::NaiveDate;
use thiserror::Error;
use validator::Validate;

use crate::client::{ClientField, NewClient};

/// Shown when any required field is empty
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// A single add-client rule violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientValidationError {
    #[error("{} is required", required_label(*.0))]
    MissingRequired(ClientField),

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Invalid date of birth format. Expected format: YYYY-MM-DD")]
    InvalidDateOfBirth,

    #[error("Date of birth must be in the past")]
    FutureDateOfBirth,
}

fn required_label(field: ClientField) -> &'static str {
    match field {
        ClientField::FirstName => "First name",
        ClientField::LastName => "Last name",
        ClientField::Email => "Email",
        ClientField::DateOfBirth => "Date of birth",
        ClientField::Phone => "Phone",
        ClientField::Address => "Address",
        ClientField::Occupation => "Occupation",
        ClientField::AnnualIncome => "Annual income",
    }
}

impl ClientValidationError {
    pub fn field(&self) -> ClientField {
        match self {
            ClientValidationError::MissingRequired(field) => *field,
            ClientValidationError::InvalidEmail => ClientField::Email,
            ClientValidationError::InvalidDateOfBirth
            | ClientValidationError::FutureDateOfBirth => ClientField::DateOfBirth,
        }
    }
}

/// Outcome of validating a new client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientValidationReport {
    errors: Vec<ClientValidationError>,
}

impl ClientValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ClientValidationError] {
        &self.errors
    }

    pub fn first(&self) -> Option<&ClientValidationError> {
        self.errors.first()
    }

    /// Violations belonging to one field, for inline hints
    pub fn for_field(&self, field: ClientField) -> Vec<&ClientValidationError> {
        self.errors.iter().filter(|e| e.field() == field).collect()
    }

    /// One-line summary for the form banner
    pub fn summary(&self) -> Option<String> {
        let missing = self
            .errors
            .iter()
            .any(|e| matches!(e, ClientValidationError::MissingRequired(_)));
        if missing {
            Some(REQUIRED_FIELDS_MESSAGE.to_string())
        } else {
            self.first().map(ToString::to_string)
        }
    }
}

/// Validator for the add-client form
pub struct ClientValidator;

impl ClientValidator {
    /// Validates a new client as of `today`
    pub fn validate(client: &NewClient, today: NaiveDate) -> ClientValidationReport {
        let client = client.trimmed();
        let mut errors = Vec::new();

        let required = [
            (ClientField::FirstName, &client.first_name),
            (ClientField::LastName, &client.last_name),
            (ClientField::Email, &client.email),
            (ClientField::DateOfBirth, &client.date_of_birth),
        ];
        for (field, value) in required {
            if value.is_empty() {
                errors.push(ClientValidationError::MissingRequired(field));
            }
        }

        if !client.email.is_empty() {
            if let Err(e) = client.validate() {
                if e.field_errors().contains_key("email") {
                    errors.push(ClientValidationError::InvalidEmail);
                }
            }
        }

        if !client.date_of_birth.is_empty() {
            match client.parsed_date_of_birth() {
                None => errors.push(ClientValidationError::InvalidDateOfBirth),
                Some(dob) if dob >= today => errors.push(ClientValidationError::FutureDateOfBirth),
                Some(_) => {}
            }
        }

        ClientValidationReport { errors }
    }
}
