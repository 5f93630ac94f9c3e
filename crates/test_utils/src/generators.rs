//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::ClientId;
use domain_policy::{PolicyDraft, PolicyType};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::PolicyDraftBuilder;

/// Strategy for generating any policy type
pub fn policy_type_strategy() -> impl Strategy<Value = PolicyType> {
    proptest::sample::select(PolicyType::ALL.to_vec())
}

/// Strategy for generating valid client ids
pub fn client_id_strategy() -> impl Strategy<Value = ClientId> {
    (1i64..1_000_000i64).prop_map(|id| ClientId::new(id).unwrap())
}

/// Strategy for generating positive coverage amounts with cents
pub fn coverage_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000_00i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating zero or negative coverage amounts
pub fn non_positive_coverage_strategy() -> impl Strategy<Value = Decimal> {
    (-100_000_000_00i64..=0i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating term lengths the form accepts
pub fn term_years_strategy() -> impl Strategy<Value = i32> {
    1i32..=50i32
}

/// Strategy for generating drafts that pass validation
pub fn valid_draft_strategy() -> impl Strategy<Value = PolicyDraft> {
    (policy_type_strategy(), coverage_strategy(), term_years_strategy()).prop_map(
        |(policy_type, coverage, years)| {
            PolicyDraftBuilder::new(policy_type)
                .coverage(coverage)
                .term_years(years)
                .build()
        },
    )
}
