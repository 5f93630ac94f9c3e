//! Add-client form
//!
//! Holds the raw [`NewClient`] draft, validates it, and creates the client
//! through a [`ClientPort`]. A failed submission leaves the draft in place.

use chrono::NaiveDate;
use tracing::{info, warn};

use core_kernel::OperationMetadata;
use domain_policy::draft::coerce_number;

use crate::client::{Client, ClientField, NewClient};
use crate::error::ClientFormError;
use crate::ports::ClientPort;
use crate::validation::{ClientValidationReport, ClientValidator};

/// State behind the add-client form
#[derive(Debug, Clone, Default)]
pub struct ClientForm {
    draft: NewClient,
    error: Option<String>,
}

impl ClientForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw input for a field named by its wire name
    pub fn set_field(&mut self, name: &str, raw_value: &str) -> Result<(), ClientFormError> {
        let field: ClientField = name.parse()?;
        self.set(field, raw_value);
        Ok(())
    }

    /// Stores raw input for a field; annual income coerces to zero on bad input
    pub fn set(&mut self, field: ClientField, raw_value: &str) {
        let value = raw_value.to_string();
        match field {
            ClientField::FirstName => self.draft.first_name = value,
            ClientField::LastName => self.draft.last_name = value,
            ClientField::Email => self.draft.email = value,
            ClientField::Phone => self.draft.phone = value,
            ClientField::DateOfBirth => self.draft.date_of_birth = value,
            ClientField::Address => self.draft.address = value,
            ClientField::Occupation => self.draft.occupation = value,
            ClientField::AnnualIncome => self.draft.annual_income = coerce_number(raw_value),
        }
    }

    /// Checks the draft as of the local current date
    pub fn validate(&self) -> ClientValidationReport {
        self.validate_on(chrono::Local::now().date_naive())
    }

    pub fn validate_on(&self, today: NaiveDate) -> ClientValidationReport {
        ClientValidator::validate(&self.draft, today)
    }

    /// Validates and creates the client
    ///
    /// Returns the created record, which always carries an id.
    pub async fn submit(&mut self, port: &dyn ClientPort) -> Result<Client, ClientFormError> {
        self.submit_on(port, chrono::Local::now().date_naive()).await
    }

    pub async fn submit_on(
        &mut self,
        port: &dyn ClientPort,
        today: NaiveDate,
    ) -> Result<Client, ClientFormError> {
        self.error = None;

        let report = self.validate_on(today);
        if !report.is_valid() {
            return Err(self.fail(ClientFormError::Validation(report)));
        }

        let payload = self.draft.trimmed();
        let created = match port
            .create_client(&payload, Some(OperationMetadata::correlated()))
            .await
        {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Client creation failed");
                return Err(self.fail(ClientFormError::service(e)));
            }
        };

        match created.id {
            Some(id) => {
                info!(client_id = %id, "Client created");
                self.draft = NewClient::default();
                Ok(created)
            }
            None => {
                warn!("Client created without an id");
                Err(self.fail(ClientFormError::InvalidResponse))
            }
        }
    }

    fn fail(&mut self, error: ClientFormError) -> ClientFormError {
        self.error = Some(error.user_message());
        error
    }

    pub fn draft(&self) -> &NewClient {
        &self.draft
    }

    /// The message currently shown to the user, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
