//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the CRM's clients and policy drafts.
//! These fixtures are consistent and predictable for unit tests.

use chrono::NaiveDate;
use core_kernel::{ClientId, PolicyId};
use domain_client::Client;
use domain_policy::{PolicyDraft, PolicyType};
use rust_decimal_macros::dec;

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// The "today" every fixture draft starts on (Jan 1, 2024)
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    pub fn date_of_birth() -> NaiveDate {
        NaiveDate::from_ymd_opt(1985, 12, 10).unwrap()
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn client_id(id: i64) -> ClientId {
        ClientId::new(id).unwrap()
    }

    pub fn policy_id(id: i64) -> PolicyId {
        PolicyId::new(id).unwrap()
    }
}

/// Fixture for client records
pub struct ClientFixtures;

impl ClientFixtures {
    /// A stored client with no policies
    pub fn ada(id: i64) -> Client {
        Client {
            id: Some(IdFixtures::client_id(id)),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            phone: Some("555-0100".to_string()),
            date_of_birth: Some(DateFixtures::date_of_birth()),
            address: Some("12 St James's Square, London".to_string()),
            occupation: Some("Mathematician".to_string()),
            annual_income: Some(dec!(85000)),
            policies: Some(Vec::new()),
        }
    }
}

/// Fixture for policy drafts that pass validation
pub struct DraftFixtures;

impl DraftFixtures {
    /// Term life, $250,000 over 20 years
    pub fn term_life() -> PolicyDraft {
        let mut draft = PolicyDraft::new(DateFixtures::today());
        draft.coverage_amount = dec!(250000);
        draft.term_years = 20;
        draft.beneficiary_name = "Jane Doe".to_string();
        draft.beneficiary_relation = "Spouse".to_string();
        draft
    }

    /// Whole life with a cash value
    pub fn whole_life() -> PolicyDraft {
        let mut draft = Self::term_life();
        draft.policy_type = PolicyType::WholeLife;
        draft.cash_value = dec!(10000);
        draft
    }

    /// Universal life with an interest rate
    pub fn universal_life() -> PolicyDraft {
        let mut draft = Self::term_life();
        draft.policy_type = PolicyType::UniversalLife;
        draft.cash_value = dec!(5000);
        draft.interest_rate = Some(dec!(4.5));
        draft
    }
}
