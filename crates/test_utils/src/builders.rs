//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! Tests specify only the fields they care about; names and emails default
//! to generated values.

use domain_client::Client;
use domain_policy::{Policy, PolicyDraft, PolicyType};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{DateFixtures, IdFixtures};

/// Builder for client records as the service returns them
pub struct ClientBuilder {
    client: Client,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Creates a builder with a generated name and email
    pub fn new() -> Self {
        Self {
            client: Client {
                first_name: Some(FirstName().fake()),
                last_name: Some(LastName().fake()),
                email: Some(SafeEmail().fake()),
                date_of_birth: Some(DateFixtures::date_of_birth()),
                annual_income: Some(dec!(60000)),
                policies: Some(Vec::new()),
                ..Default::default()
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.client.id = Some(IdFixtures::client_id(id));
        self
    }

    pub fn with_name(mut self, first: &str, last: &str) -> Self {
        self.client.first_name = Some(first.to_string());
        self.client.last_name = Some(last.to_string());
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.client.email = Some(email.to_string());
        self
    }

    /// Adds a policy to the client's policy list
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.client.policies.get_or_insert_with(Vec::new).push(policy);
        self
    }

    /// Leaves the policy list out entirely, as some service versions do
    pub fn without_policies(mut self) -> Self {
        self.client.policies = None;
        self
    }

    pub fn build(self) -> Client {
        self.client
    }
}

/// Builder for policy drafts
pub struct PolicyDraftBuilder {
    draft: PolicyDraft,
}

impl PolicyDraftBuilder {
    /// Creates a builder for a valid draft of the given type
    ///
    /// Type-specific required fields are filled in; everything else keeps
    /// the form defaults.
    pub fn new(policy_type: PolicyType) -> Self {
        let mut draft = PolicyDraft::new(DateFixtures::today());
        draft.policy_type = policy_type;
        draft.coverage_amount = dec!(100000);
        draft.beneficiary_name = "Jane Doe".to_string();
        draft.beneficiary_relation = "Spouse".to_string();

        let applicability = policy_type.applicability();
        if applicability.interest_rate.is_required() {
            draft.interest_rate = Some(dec!(3.5));
        }
        if applicability.investment_component.is_required() {
            draft.investment_component = dec!(25000);
        }
        Self { draft }
    }

    pub fn coverage(mut self, amount: Decimal) -> Self {
        self.draft.coverage_amount = amount;
        self
    }

    pub fn term_years(mut self, years: i32) -> Self {
        self.draft.term_years = years;
        self
    }

    pub fn build(self) -> PolicyDraft {
        self.draft
    }
}

/// Builder for stored policy records
pub struct PolicyRecordBuilder {
    policy: Policy,
}

impl PolicyRecordBuilder {
    pub fn new(id: i64, policy_type: PolicyType) -> Self {
        Self {
            policy: Policy {
                id: Some(IdFixtures::policy_id(id)),
                policy_type: Some(policy_type),
                coverage_amount: Some(dec!(250000)),
                premium_amount: Some(dec!(125)),
                start_date: Some(DateFixtures::today()),
                beneficiary_name: Some("Jane Doe".to_string()),
                beneficiary_relation: Some("Spouse".to_string()),
                ..Default::default()
            },
        }
    }

    pub fn coverage(mut self, amount: Decimal) -> Self {
        self.policy.coverage_amount = Some(amount);
        self
    }

    pub fn term_years(mut self, years: i32) -> Self {
        self.policy.term_years = Some(years);
        self
    }

    pub fn build(self) -> Policy {
        self.policy
    }
}
