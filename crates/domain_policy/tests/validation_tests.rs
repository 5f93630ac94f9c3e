//! Validation and payload tests for the Policy domain
//!
//! Tests cover the per-type validation rules, field applicability, and the
//! exact shape of the payload produced for each policy type.

use core_kernel::ClientId;
use domain_policy::{
    PolicyDraft, PolicyField, PolicyRequest, PolicyType, PolicyValidationError,
    PolicyValidator, Requirement,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use test_utils::{
    client_id_strategy, non_positive_coverage_strategy, policy_type_strategy,
    valid_draft_strategy, DateFixtures, IdFixtures,
};

fn client() -> Option<ClientId> {
    Some(IdFixtures::client_id(1))
}

/// Draft with only the base fields set
fn base_draft(policy_type: PolicyType, coverage: Decimal) -> PolicyDraft {
    let mut draft = PolicyDraft::new(DateFixtures::today());
    draft.policy_type = policy_type;
    draft.coverage_amount = coverage;
    draft.beneficiary_name = "Jane Doe".to_string();
    draft.beneficiary_relation = "Spouse".to_string();
    draft
}

fn payload_keys(draft: &PolicyDraft) -> Vec<String> {
    let json = serde_json::to_value(PolicyRequest::from_draft(draft)).unwrap();
    let mut keys: Vec<String> = json.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

fn sorted(keys: &[&str]) -> Vec<String> {
    let mut keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    keys.sort();
    keys
}

// ============================================================================
// Per-type rules
// ============================================================================

mod type_rules {
    use super::*;

    #[test]
    fn test_term_life_term_years() {
        let mut draft = base_draft(PolicyType::TermLife, dec!(100000));
        draft.term_years = 0;
        let report = PolicyValidator::validate(client(), &draft);
        assert_eq!(report.errors(), &[PolicyValidationError::InvalidTermYears]);

        draft.term_years = 5;
        assert!(PolicyValidator::validate(client(), &draft).is_valid());
    }

    #[test]
    fn test_universal_life_interest_rate() {
        let mut draft = base_draft(PolicyType::UniversalLife, dec!(100000));
        let report = PolicyValidator::validate(client(), &draft);
        assert_eq!(report.errors(), &[PolicyValidationError::MissingInterestRate]);

        draft.apply(PolicyField::InterestRate, "3.5").unwrap();
        assert!(PolicyValidator::validate(client(), &draft).is_valid());
    }

    #[test]
    fn test_universal_life_zero_rate_is_allowed() {
        let mut draft = base_draft(PolicyType::UniversalLife, dec!(100000));
        draft.apply(PolicyField::InterestRate, "0").unwrap();
        assert!(PolicyValidator::validate(client(), &draft).is_valid());
    }

    #[test]
    fn test_universal_life_rate_bounds() {
        let mut draft = base_draft(PolicyType::UniversalLife, dec!(100000));
        draft.apply(PolicyField::InterestRate, "-1").unwrap();
        assert_eq!(
            PolicyValidator::validate(client(), &draft).first(),
            Some(&PolicyValidationError::MissingInterestRate)
        );

        draft.apply(PolicyField::InterestRate, "100.5").unwrap();
        assert_eq!(
            PolicyValidator::validate(client(), &draft).first(),
            Some(&PolicyValidationError::InterestRateOutOfRange)
        );
    }

    #[test]
    fn test_variable_life_investment_component() {
        let mut draft = base_draft(PolicyType::VariableLife, dec!(100000));
        let report = PolicyValidator::validate(client(), &draft);
        assert_eq!(report.errors(), &[PolicyValidationError::MissingInvestmentComponent]);

        draft.apply(PolicyField::InvestmentComponent, "1000").unwrap();
        assert!(PolicyValidator::validate(client(), &draft).is_valid());
    }

    #[test]
    fn test_base_only_types_need_nothing_else() {
        for policy_type in [
            PolicyType::WholeLife,
            PolicyType::IndexedUniversalLife,
            PolicyType::FinalExpense,
            PolicyType::GroupLife,
        ] {
            let draft = base_draft(policy_type, dec!(50000));
            assert!(
                PolicyValidator::validate(client(), &draft).is_valid(),
                "{policy_type} should validate with base fields only"
            );
        }
    }

    #[test]
    fn test_missing_start_date_and_beneficiary() {
        let mut draft = base_draft(PolicyType::WholeLife, dec!(50000));
        draft.start_date = String::new();
        draft.beneficiary_relation = "  ".to_string();

        let report = PolicyValidator::validate(client(), &draft);
        assert_eq!(
            report.errors(),
            &[
                PolicyValidationError::MissingStartDate,
                PolicyValidationError::MissingBeneficiaryInfo(PolicyField::BeneficiaryRelation),
            ]
        );
        assert_eq!(report.first_message().as_deref(), Some("Start date is required"));
    }

    #[test]
    fn test_missing_client_reference() {
        let draft = base_draft(PolicyType::WholeLife, dec!(50000));
        let report = PolicyValidator::validate(None, &draft);
        assert_eq!(report.errors(), &[PolicyValidationError::InvalidClientReference]);
    }
}

// ============================================================================
// Applicability and payload shape
// ============================================================================

mod payload_shape {
    use super::*;

    #[test]
    fn test_applicability_table() {
        let term = PolicyType::TermLife.applicability();
        assert_eq!(term.term, Requirement::Required);
        assert!(!term.cash_value.is_applicable());

        let universal = PolicyType::UniversalLife.applicability();
        assert_eq!(universal.cash_value, Requirement::Optional);
        assert!(universal.interest_rate.is_required());

        let variable = PolicyType::VariableLife.applicability();
        assert!(variable.investment_component.is_required());

        assert!(PolicyType::FinalExpense.applicability().is_base_only());
        assert!(!PolicyType::WholeLife.applicability().is_base_only());
    }

    #[test]
    fn test_end_to_end_term_life_payload() {
        let mut draft = PolicyDraft::new(chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        draft.apply(PolicyField::PolicyType, "TERM_LIFE").unwrap();
        draft.apply(PolicyField::CoverageAmount, "100000").unwrap();
        draft.apply(PolicyField::StartDate, "2024-01-01").unwrap();
        draft.apply(PolicyField::TermYears, "20").unwrap();
        draft.apply(PolicyField::BeneficiaryName, "Jane Doe").unwrap();
        draft.apply(PolicyField::BeneficiaryRelation, "Spouse").unwrap();

        assert!(PolicyValidator::validate(client(), &draft).is_valid());
        assert_eq!(
            payload_keys(&draft),
            sorted(&[
                "policyType",
                "coverageAmount",
                "startDate",
                "beneficiaryName",
                "beneficiaryRelation",
                "termYears",
                "convertible",
            ])
        );

        let json = serde_json::to_value(PolicyRequest::from_draft(&draft)).unwrap();
        assert_eq!(json["termYears"], 20);
        assert_eq!(json["convertible"], false);
        assert_eq!(json["startDate"], "2024-01-01");
    }

    #[test]
    fn test_switching_type_drops_term_fields() {
        let mut draft = base_draft(PolicyType::TermLife, dec!(100000));
        draft.apply(PolicyField::TermYears, "25").unwrap();
        draft.apply(PolicyField::Convertible, "true").unwrap();
        draft.apply(PolicyField::PolicyType, "WHOLE_LIFE").unwrap();

        // Values are still held by the draft
        assert_eq!(draft.term_years, 25);
        assert!(draft.convertible);

        assert_eq!(
            payload_keys(&draft),
            sorted(&[
                "policyType",
                "coverageAmount",
                "startDate",
                "beneficiaryName",
                "beneficiaryRelation",
            ])
        );
    }

    #[test]
    fn test_switching_back_restores_values() {
        let mut draft = base_draft(PolicyType::TermLife, dec!(100000));
        draft.apply(PolicyField::TermYears, "25").unwrap();
        draft.apply(PolicyField::PolicyType, "VARIABLE_LIFE").unwrap();
        draft.apply(PolicyField::PolicyType, "TERM_LIFE").unwrap();

        let json = serde_json::to_value(PolicyRequest::from_draft(&draft)).unwrap();
        assert_eq!(json["termYears"], 25);
    }

    #[test]
    fn test_universal_life_includes_cash_value_when_set() {
        let mut draft = base_draft(PolicyType::UniversalLife, dec!(100000));
        draft.apply(PolicyField::InterestRate, "4").unwrap();
        draft.apply(PolicyField::CashValue, "1500").unwrap();
        draft.apply(PolicyField::InvestmentComponent, "700").unwrap();

        assert_eq!(
            payload_keys(&draft),
            sorted(&[
                "policyType",
                "coverageAmount",
                "startDate",
                "beneficiaryName",
                "beneficiaryRelation",
                "cashValue",
                "interestRate",
            ])
        );
    }

    #[test]
    fn test_payload_trims_beneficiary() {
        let mut draft = base_draft(PolicyType::GroupLife, dec!(10000));
        draft.apply(PolicyField::BeneficiaryName, "  Jane Doe ").unwrap();

        let request = PolicyRequest::from_draft(&draft);
        assert_eq!(request.beneficiary_name, "Jane Doe");
        assert_eq!(request.policy_type(), PolicyType::GroupLife);
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_non_positive_coverage_rejected_for_every_type(
        policy_type in policy_type_strategy(),
        coverage in non_positive_coverage_strategy(),
    ) {
        let draft = base_draft(policy_type, coverage);
        let report = PolicyValidator::validate(client(), &draft);
        prop_assert!(report.contains(&PolicyValidationError::InvalidCoverageAmount));
    }

    #[test]
    fn prop_complete_drafts_pass_for_any_client(
        client_id in client_id_strategy(),
        draft in valid_draft_strategy(),
    ) {
        let report = PolicyValidator::validate(Some(client_id), &draft);
        prop_assert!(report.is_valid(), "{:?}", report.errors());
    }

    #[test]
    fn prop_unbound_form_always_reports_client_first(draft in valid_draft_strategy()) {
        let report = PolicyValidator::validate(None, &draft);
        prop_assert_eq!(report.first(), Some(&PolicyValidationError::InvalidClientReference));
    }

    #[test]
    fn prop_payload_type_matches_draft(policy_type in policy_type_strategy()) {
        let draft = base_draft(policy_type, dec!(1000));
        let json = serde_json::to_value(PolicyRequest::from_draft(&draft)).unwrap();
        prop_assert_eq!(json["policyType"].as_str(), Some(policy_type.code()));
    }

    #[test]
    fn prop_garbage_numeric_input_coerces_to_zero(raw in "[a-zA-Z ]{0,12}") {
        let mut draft = base_draft(PolicyType::TermLife, dec!(1000));
        draft.apply(PolicyField::CoverageAmount, &raw).unwrap();
        prop_assert_eq!(draft.coverage_amount, Decimal::ZERO);
    }
}
