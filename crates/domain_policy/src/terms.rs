//! Type-specific policy terms and the outgoing policy payload
//!
//! [`PolicyTerms`] has one variant per [`PolicyType`], each carrying exactly
//! the fields that apply to that type. A payload built from a draft therefore
//! cannot include stale values from a type the user switched away from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::draft::PolicyDraft;
use crate::policy_type::PolicyType;

/// Type-specific terms, tagged on the wire by `policyType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "policyType",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum PolicyTerms {
    TermLife {
        term_years: i32,
        convertible: bool,
    },
    WholeLife {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cash_value: Option<Decimal>,
    },
    UniversalLife {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cash_value: Option<Decimal>,
        interest_rate: Decimal,
    },
    VariableLife {
        investment_component: Decimal,
    },
    IndexedUniversalLife,
    FinalExpense,
    GroupLife,
}

impl PolicyTerms {
    /// Selects the terms applicable to the draft's current policy type
    ///
    /// Optional amounts are dropped when zero. An unset interest rate is sent
    /// as zero; validation rejects that case before submission.
    pub fn from_draft(draft: &PolicyDraft) -> Self {
        let optional = |value: Decimal| (!value.is_zero()).then_some(value);

        match draft.policy_type {
            PolicyType::TermLife => PolicyTerms::TermLife {
                term_years: draft.term_years,
                convertible: draft.convertible,
            },
            PolicyType::WholeLife => PolicyTerms::WholeLife {
                cash_value: optional(draft.cash_value),
            },
            PolicyType::UniversalLife => PolicyTerms::UniversalLife {
                cash_value: optional(draft.cash_value),
                interest_rate: draft.interest_rate.unwrap_or(Decimal::ZERO),
            },
            PolicyType::VariableLife => PolicyTerms::VariableLife {
                investment_component: draft.investment_component,
            },
            PolicyType::IndexedUniversalLife => PolicyTerms::IndexedUniversalLife,
            PolicyType::FinalExpense => PolicyTerms::FinalExpense,
            PolicyType::GroupLife => PolicyTerms::GroupLife,
        }
    }

    pub fn policy_type(&self) -> PolicyType {
        match self {
            PolicyTerms::TermLife { .. } => PolicyType::TermLife,
            PolicyTerms::WholeLife { .. } => PolicyType::WholeLife,
            PolicyTerms::UniversalLife { .. } => PolicyType::UniversalLife,
            PolicyTerms::VariableLife { .. } => PolicyType::VariableLife,
            PolicyTerms::IndexedUniversalLife => PolicyType::IndexedUniversalLife,
            PolicyTerms::FinalExpense => PolicyType::FinalExpense,
            PolicyTerms::GroupLife => PolicyType::GroupLife,
        }
    }
}

/// Policy payload sent for both premium estimates and creation
///
/// Omits the server-assigned `id`, `premiumAmount`, and `endDate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRequest {
    #[serde(flatten)]
    pub terms: PolicyTerms,
    pub coverage_amount: Decimal,
    pub start_date: String,
    pub beneficiary_name: String,
    pub beneficiary_relation: String,
}

impl PolicyRequest {
    /// Snapshots the draft into a payload, trimming beneficiary details
    pub fn from_draft(draft: &PolicyDraft) -> Self {
        Self {
            terms: PolicyTerms::from_draft(draft),
            coverage_amount: draft.coverage_amount,
            start_date: draft.start_date.trim().to_string(),
            beneficiary_name: draft.beneficiary_name.trim().to_string(),
            beneficiary_relation: draft.beneficiary_relation.trim().to_string(),
        }
    }

    pub fn policy_type(&self) -> PolicyType {
        self.terms.policy_type()
    }
}
