//! The mutable new-policy draft
//!
//! A [`PolicyDraft`] holds exactly what the user has typed so far. Raw input
//! is coerced leniently here (bad numbers become zero); judging the values is
//! left to [`crate::validation`] at submission time.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PolicyFormError;
use crate::policy_type::PolicyType;

/// Default term offered for a new term-life draft
pub const DEFAULT_TERM_YEARS: i32 = 10;

/// Editable fields of the new-policy form, named as on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyField {
    PolicyType,
    CoverageAmount,
    StartDate,
    TermYears,
    Convertible,
    CashValue,
    InvestmentComponent,
    InterestRate,
    BeneficiaryName,
    BeneficiaryRelation,
}

impl PolicyField {
    pub const ALL: [PolicyField; 10] = [
        PolicyField::PolicyType,
        PolicyField::CoverageAmount,
        PolicyField::StartDate,
        PolicyField::TermYears,
        PolicyField::Convertible,
        PolicyField::CashValue,
        PolicyField::InvestmentComponent,
        PolicyField::InterestRate,
        PolicyField::BeneficiaryName,
        PolicyField::BeneficiaryRelation,
    ];

    /// Returns the camelCase wire name
    pub fn name(&self) -> &'static str {
        match self {
            PolicyField::PolicyType => "policyType",
            PolicyField::CoverageAmount => "coverageAmount",
            PolicyField::StartDate => "startDate",
            PolicyField::TermYears => "termYears",
            PolicyField::Convertible => "convertible",
            PolicyField::CashValue => "cashValue",
            PolicyField::InvestmentComponent => "investmentComponent",
            PolicyField::InterestRate => "interestRate",
            PolicyField::BeneficiaryName => "beneficiaryName",
            PolicyField::BeneficiaryRelation => "beneficiaryRelation",
        }
    }

    /// Numeric fields are coerced to zero on unparseable input
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PolicyField::CoverageAmount
                | PolicyField::TermYears
                | PolicyField::CashValue
                | PolicyField::InvestmentComponent
                | PolicyField::InterestRate
        )
    }

    /// Changes to these fields make the current premium estimate stale
    pub fn affects_estimate(&self) -> bool {
        matches!(self, PolicyField::CoverageAmount | PolicyField::PolicyType)
    }
}

impl fmt::Display for PolicyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PolicyField {
    type Err = PolicyFormError;

    /// Accepts the camelCase wire name or its snake_case spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.trim().chars().filter(|c| *c != '_' && *c != '-').collect();
        PolicyField::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| PolicyFormError::UnknownField(s.trim().to_string()))
    }
}

/// Parses user input as a number, coercing anything unusable to zero
///
/// Accepts plain decimals and scientific notation. Empty input, garbage,
/// and out-of-range values all yield `0`.
pub fn coerce_number(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Parses user input as a whole number, truncating any fraction
pub fn coerce_integer(raw: &str) -> i32 {
    coerce_number(raw).trunc().to_i32().unwrap_or(0)
}

/// Parses boolean-ish input (`true`, `yes`, `on`, `1`)
pub fn coerce_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "on" | "1"
    )
}

/// Everything the user has entered for a new policy
///
/// Values for fields that do not apply to the current `policy_type` are kept
/// (switching back restores them) but never leave the draft: payloads are
/// built through [`crate::terms::PolicyTerms`], which only carries the fields
/// of one type.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDraft {
    pub policy_type: PolicyType,
    pub coverage_amount: Decimal,
    /// Raw `YYYY-MM-DD` text as entered
    pub start_date: String,
    pub term_years: i32,
    pub convertible: bool,
    pub cash_value: Decimal,
    pub investment_component: Decimal,
    /// `None` until the user enters a rate
    pub interest_rate: Option<Decimal>,
    pub beneficiary_name: String,
    pub beneficiary_relation: String,
}

impl PolicyDraft {
    /// Creates a draft with form defaults, starting on `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            policy_type: PolicyType::default(),
            coverage_amount: Decimal::ZERO,
            start_date: today.format("%Y-%m-%d").to_string(),
            term_years: DEFAULT_TERM_YEARS,
            convertible: false,
            cash_value: Decimal::ZERO,
            investment_component: Decimal::ZERO,
            interest_rate: None,
            beneficiary_name: String::new(),
            beneficiary_relation: String::new(),
        }
    }

    /// Creates a draft with defaults, starting on the local current date
    pub fn starting_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Stores raw input for one field
    ///
    /// Returns `true` when the stored value actually changed.
    pub fn apply(&mut self, field: PolicyField, raw: &str) -> Result<bool, PolicyFormError> {
        let changed = match field {
            PolicyField::PolicyType => {
                let policy_type: PolicyType = raw.parse()?;
                replace(&mut self.policy_type, policy_type)
            }
            PolicyField::CoverageAmount => replace(&mut self.coverage_amount, coerce_number(raw)),
            PolicyField::StartDate => replace(&mut self.start_date, raw.trim().to_string()),
            PolicyField::TermYears => replace(&mut self.term_years, coerce_integer(raw)),
            PolicyField::Convertible => replace(&mut self.convertible, coerce_flag(raw)),
            PolicyField::CashValue => replace(&mut self.cash_value, coerce_number(raw)),
            PolicyField::InvestmentComponent => {
                replace(&mut self.investment_component, coerce_number(raw))
            }
            PolicyField::InterestRate => {
                replace(&mut self.interest_rate, Some(coerce_number(raw)))
            }
            PolicyField::BeneficiaryName => replace(&mut self.beneficiary_name, raw.to_string()),
            PolicyField::BeneficiaryRelation => {
                replace(&mut self.beneficiary_relation, raw.to_string())
            }
        };
        Ok(changed)
    }

    /// Parses the start date, if it is a valid calendar date
    pub fn parsed_start_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d").ok()
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
