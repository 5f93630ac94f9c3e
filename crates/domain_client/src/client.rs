//! Client records and the add-client draft
//!
//! [`Client`] mirrors what the CRM service returns: every field may be null
//! on the wire, so all of them are optional here. [`NewClient`] is the
//! payload built by the add-client form.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::ClientId;
use domain_policy::Policy;

/// A client as held by the CRM service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ClientId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub annual_income: Option<Decimal>,
    pub policies: Option<Vec<Policy>>,
}

impl Client {
    /// Returns "First Last", skipping missing parts
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Policies held by the client; empty when the service sent none
    pub fn policies(&self) -> &[Policy] {
        self.policies.as_deref().unwrap_or_default()
    }
}

/// Editable fields of the add-client form, named as on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientField {
    FirstName,
    LastName,
    Email,
    Phone,
    DateOfBirth,
    Address,
    Occupation,
    AnnualIncome,
}

impl ClientField {
    pub const ALL: [ClientField; 8] = [
        ClientField::FirstName,
        ClientField::LastName,
        ClientField::Email,
        ClientField::Phone,
        ClientField::DateOfBirth,
        ClientField::Address,
        ClientField::Occupation,
        ClientField::AnnualIncome,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ClientField::FirstName => "firstName",
            ClientField::LastName => "lastName",
            ClientField::Email => "email",
            ClientField::Phone => "phone",
            ClientField::DateOfBirth => "dateOfBirth",
            ClientField::Address => "address",
            ClientField::Occupation => "occupation",
            ClientField::AnnualIncome => "annualIncome",
        }
    }

    /// Fields that must be filled in before the client can be created
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            ClientField::FirstName
                | ClientField::LastName
                | ClientField::Email
                | ClientField::DateOfBirth
        )
    }
}

impl std::fmt::Display for ClientField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ClientField {
    type Err = crate::error::ClientFormError;

    /// Accepts the camelCase wire name or its snake_case spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.trim().chars().filter(|c| *c != '_' && *c != '-').collect();
        ClientField::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| crate::error::ClientFormError::UnknownField(s.trim().to_string()))
    }
}

/// Payload for creating a client
///
/// `date_of_birth` stays as entered (`YYYY-MM-DD`); the service parses it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub address: String,
    pub occupation: String,
    pub annual_income: Decimal,
}

impl NewClient {
    /// Parses the date of birth, if it is a valid calendar date
    pub fn parsed_date_of_birth(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_of_birth.trim(), "%Y-%m-%d").ok()
    }

    /// Copy with surrounding whitespace removed from every text field
    pub fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            date_of_birth: self.date_of_birth.trim().to_string(),
            address: self.address.trim().to_string(),
            occupation: self.occupation.trim().to_string(),
            annual_income: self.annual_income,
        }
    }
}
