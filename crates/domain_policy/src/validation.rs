//! New-policy validation rules
//!
//! Every rule is evaluated independently and all violations are collected.
//! The form shows the first one; callers wanting the full list read
//! [`ValidationReport::errors`].
//!
//! # Rules
//!
//! - A positive client reference must be bound
//! - Coverage amount must be greater than zero
//! - Start date is required and must be `YYYY-MM-DD`
//! - Beneficiary name and relation are required (after trimming)
//! - Term life: term years greater than zero
//! - Universal life: interest rate present, between 0 and 100
//! - Variable life: investment component greater than zero

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use core_kernel::ClientId;
use crate::draft::{PolicyDraft, PolicyField};
use crate::policy_type::PolicyType;

/// A single client-side rule violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyValidationError {
    #[error("Invalid client ID")]
    InvalidClientReference,

    #[error("Coverage amount must be greater than 0")]
    InvalidCoverageAmount,

    #[error("Start date is required")]
    MissingStartDate,

    #[error("Invalid start date format. Expected format: YYYY-MM-DD")]
    InvalidStartDate,

    #[error("{} is required", beneficiary_label(*.0))]
    MissingBeneficiaryInfo(PolicyField),

    #[error("Term years must be greater than 0 for Term Life policies")]
    InvalidTermYears,

    #[error("Interest rate is required for Universal Life policies")]
    MissingInterestRate,

    #[error("Interest rate must be between 0 and 100")]
    InterestRateOutOfRange,

    #[error("Investment component is required for Variable Life policies")]
    MissingInvestmentComponent,
}

fn beneficiary_label(field: PolicyField) -> &'static str {
    match field {
        PolicyField::BeneficiaryRelation => "Beneficiary relation",
        _ => "Beneficiary name",
    }
}

impl PolicyValidationError {
    /// Returns the form field the violation belongs to, if any
    pub fn field(&self) -> Option<PolicyField> {
        match self {
            PolicyValidationError::InvalidClientReference => None,
            PolicyValidationError::InvalidCoverageAmount => Some(PolicyField::CoverageAmount),
            PolicyValidationError::MissingStartDate
            | PolicyValidationError::InvalidStartDate => Some(PolicyField::StartDate),
            PolicyValidationError::MissingBeneficiaryInfo(field) => Some(*field),
            PolicyValidationError::InvalidTermYears => Some(PolicyField::TermYears),
            PolicyValidationError::MissingInterestRate
            | PolicyValidationError::InterestRateOutOfRange => Some(PolicyField::InterestRate),
            PolicyValidationError::MissingInvestmentComponent => {
                Some(PolicyField::InvestmentComponent)
            }
        }
    }
}

/// Outcome of validating a draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<PolicyValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All violations, in rule order
    pub fn errors(&self) -> &[PolicyValidationError] {
        &self.errors
    }

    /// The violation shown to the user
    pub fn first(&self) -> Option<&PolicyValidationError> {
        self.errors.first()
    }

    pub fn first_message(&self) -> Option<String> {
        self.first().map(ToString::to_string)
    }

    pub fn contains(&self, error: &PolicyValidationError) -> bool {
        self.errors.contains(error)
    }

    fn push(&mut self, error: PolicyValidationError) {
        self.errors.push(error);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first() {
            Some(error) => write!(f, "{error}"),
            None => f.write_str("Validation failed"),
        }
    }
}

/// Validator for new-policy drafts
pub struct PolicyValidator;

impl PolicyValidator {
    /// Validates a draft for the given client reference
    ///
    /// # Arguments
    ///
    /// * `client_id` - The bound client, `None` when the route id was invalid
    /// * `draft` - The draft to check
    pub fn validate(client_id: Option<ClientId>, draft: &PolicyDraft) -> ValidationReport {
        let mut report = ValidationReport::default();

        if client_id.is_none() {
            report.push(PolicyValidationError::InvalidClientReference);
        }

        if draft.coverage_amount <= Decimal::ZERO {
            report.push(PolicyValidationError::InvalidCoverageAmount);
        }

        if draft.start_date.trim().is_empty() {
            report.push(PolicyValidationError::MissingStartDate);
        } else if draft.parsed_start_date().is_none() {
            report.push(PolicyValidationError::InvalidStartDate);
        }

        if draft.beneficiary_name.trim().is_empty() {
            report.push(PolicyValidationError::MissingBeneficiaryInfo(PolicyField::BeneficiaryName));
        }
        if draft.beneficiary_relation.trim().is_empty() {
            report.push(PolicyValidationError::MissingBeneficiaryInfo(
                PolicyField::BeneficiaryRelation,
            ));
        }

        Self::validate_type_specific(draft, &mut report);

        report
    }

    fn validate_type_specific(draft: &PolicyDraft, report: &mut ValidationReport) {
        match draft.policy_type {
            PolicyType::TermLife => {
                if draft.term_years <= 0 {
                    report.push(PolicyValidationError::InvalidTermYears);
                }
            }
            PolicyType::UniversalLife => match draft.interest_rate {
                None => report.push(PolicyValidationError::MissingInterestRate),
                Some(rate) if rate < Decimal::ZERO => {
                    report.push(PolicyValidationError::MissingInterestRate)
                }
                Some(rate) if rate > dec!(100) => {
                    report.push(PolicyValidationError::InterestRateOutOfRange)
                }
                Some(_) => {}
            },
            PolicyType::VariableLife => {
                if draft.investment_component <= Decimal::ZERO {
                    report.push(PolicyValidationError::MissingInvestmentComponent);
                }
            }
            PolicyType::WholeLife
            | PolicyType::IndexedUniversalLife
            | PolicyType::FinalExpense
            | PolicyType::GroupLife => {}
        }
    }
}
