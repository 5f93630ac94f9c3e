//! Policy records as held by the CRM service

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::PolicyId;
use crate::policy_type::PolicyType;

/// A policy as returned by the service
///
/// Every field is optional on the wire; records from older servers may omit
/// any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PolicyId>,
    pub policy_type: Option<PolicyType>,
    pub coverage_amount: Option<Decimal>,
    pub premium_amount: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub term_years: Option<i32>,
    pub beneficiary_name: Option<String>,
    pub beneficiary_relation: Option<String>,
    pub cash_value: Option<Decimal>,
    pub investment_component: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub convertible: Option<bool>,
}

impl Policy {
    /// End date the server derives for term life: start plus `termYears`
    ///
    /// Returns `None` for other policy types or when inputs are missing.
    pub fn expected_end_date(&self) -> Option<NaiveDate> {
        if self.policy_type != Some(PolicyType::TermLife) {
            return None;
        }
        let years = u32::try_from(self.term_years?).ok()?;
        self.start_date?.checked_add_months(Months::new(years.checked_mul(12)?))
    }

    /// The stored end date, falling back to [`Policy::expected_end_date`]
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        self.end_date.or_else(|| self.expected_end_date())
    }
}
