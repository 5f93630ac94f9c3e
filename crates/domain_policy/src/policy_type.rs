//! Policy types and field applicability
//!
//! Which type-specific fields a policy carries is a pure function of its
//! [`PolicyType`]. [`FieldApplicability`] captures that table once so the
//! form, the validator, and the payload builder all read the same rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PolicyFormError;

/// Life insurance product families offered by the CRM
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyType {
    /// Basic term life insurance
    #[default]
    TermLife,
    /// Permanent life insurance with fixed premium
    WholeLife,
    /// Flexible premium permanent life insurance
    UniversalLife,
    /// Permanent life insurance with investment options
    VariableLife,
    /// Universal life with market-linked returns
    IndexedUniversalLife,
    /// Small whole life policy for funeral expenses
    FinalExpense,
    /// Employer-provided life insurance
    GroupLife,
}

impl PolicyType {
    /// Every policy type, in display order
    pub const ALL: [PolicyType; 7] = [
        PolicyType::TermLife,
        PolicyType::WholeLife,
        PolicyType::UniversalLife,
        PolicyType::VariableLife,
        PolicyType::IndexedUniversalLife,
        PolicyType::FinalExpense,
        PolicyType::GroupLife,
    ];

    /// Returns the wire token (e.g. `TERM_LIFE`)
    pub fn code(&self) -> &'static str {
        match self {
            PolicyType::TermLife => "TERM_LIFE",
            PolicyType::WholeLife => "WHOLE_LIFE",
            PolicyType::UniversalLife => "UNIVERSAL_LIFE",
            PolicyType::VariableLife => "VARIABLE_LIFE",
            PolicyType::IndexedUniversalLife => "INDEXED_UNIVERSAL_LIFE",
            PolicyType::FinalExpense => "FINAL_EXPENSE",
            PolicyType::GroupLife => "GROUP_LIFE",
        }
    }

    /// Returns the human label (e.g. `TERM LIFE`)
    pub fn label(&self) -> String {
        self.code().replace('_', " ")
    }

    /// Returns which type-specific fields apply to this policy type
    pub fn applicability(&self) -> FieldApplicability {
        use Requirement::{NotApplicable, Optional, Required};

        match self {
            PolicyType::TermLife => FieldApplicability {
                term: Required,
                cash_value: NotApplicable,
                investment_component: NotApplicable,
                interest_rate: NotApplicable,
            },
            PolicyType::WholeLife => FieldApplicability {
                term: NotApplicable,
                cash_value: Optional,
                investment_component: NotApplicable,
                interest_rate: NotApplicable,
            },
            PolicyType::UniversalLife => FieldApplicability {
                term: NotApplicable,
                cash_value: Optional,
                investment_component: NotApplicable,
                interest_rate: Required,
            },
            PolicyType::VariableLife => FieldApplicability {
                term: NotApplicable,
                cash_value: NotApplicable,
                investment_component: Required,
                interest_rate: NotApplicable,
            },
            PolicyType::IndexedUniversalLife
            | PolicyType::FinalExpense
            | PolicyType::GroupLife => FieldApplicability::none(),
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for PolicyType {
    type Err = PolicyFormError;

    /// Accepts the wire token or its spaced label, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        PolicyType::ALL
            .into_iter()
            .find(|t| t.code() == normalized)
            .ok_or_else(|| PolicyFormError::UnknownPolicyType(s.trim().to_string()))
    }
}

/// How a type-specific field relates to a policy type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    NotApplicable,
    Optional,
    Required,
}

impl Requirement {
    pub fn is_applicable(&self) -> bool {
        !matches!(self, Requirement::NotApplicable)
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Requirement::Required)
    }
}

/// Applicability of each type-specific field group for one policy type
///
/// `term` covers both `termYears` and `convertible`, which always travel
/// together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldApplicability {
    pub term: Requirement,
    pub cash_value: Requirement,
    pub investment_component: Requirement,
    pub interest_rate: Requirement,
}

impl FieldApplicability {
    fn none() -> Self {
        Self {
            term: Requirement::NotApplicable,
            cash_value: Requirement::NotApplicable,
            investment_component: Requirement::NotApplicable,
            interest_rate: Requirement::NotApplicable,
        }
    }

    /// True when the policy type carries no type-specific fields at all
    pub fn is_base_only(&self) -> bool {
        *self == Self::none()
    }
}
