//! Tests for the new-policy form controller
//!
//! Tests cover estimate triggering and ordering, submission guards, and how
//! service failures reach the user.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use core_kernel::{ClientId, DomainPort, OperationMetadata, PolicyId, PortError};
use domain_policy::ports::mock::MockPolicyPort;
use domain_policy::{
    EstimateOutcome, Policy, PolicyDraft, PolicyFormController, PolicyFormError, PolicyPort,
    PolicyRequest, PolicyType, CREATE_FAILED_MESSAGE, ESTIMATE_FAILED_MESSAGE,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn open_form(port: &Arc<MockPolicyPort>) -> PolicyFormController {
    let draft = PolicyDraft::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    PolicyFormController::with_draft(port.clone(), draft)
}

/// A bound form with every base field filled in, no estimate sent yet
fn filled_form(port: &Arc<MockPolicyPort>) -> PolicyFormController {
    let mut form = open_form(port);
    form.set_field("coverageAmount", "100000").unwrap();
    form.set_field("termYears", "20").unwrap();
    form.set_field("beneficiaryName", "Jane Doe").unwrap();
    form.set_field("beneficiaryRelation", "Spouse").unwrap();
    form.bind_client("7").unwrap();
    form
}

fn client(id: i64) -> ClientId {
    ClientId::new(id).unwrap()
}

/// A policy service whose creation calls never answer
struct StalledPolicyPort;

impl DomainPort for StalledPolicyPort {}

#[async_trait]
impl PolicyPort for StalledPolicyPort {
    async fn estimate_premium(
        &self,
        _client_id: ClientId,
        _request: &PolicyRequest,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Decimal, PortError> {
        Ok(dec!(1))
    }

    async fn create_policy(
        &self,
        _client_id: ClientId,
        _request: &PolicyRequest,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Policy, PortError> {
        std::future::pending().await
    }

    async fn update_policy(
        &self,
        id: PolicyId,
        _policy: &Policy,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Policy, PortError> {
        Err(PortError::not_found("Policy", id))
    }
}

// ============================================================================
// Estimate triggering
// ============================================================================

mod estimate_trigger {
    use super::*;

    #[test]
    fn test_binding_client_triggers_when_coverage_set() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = open_form(&port);
        form.set_field("coverageAmount", "100000").unwrap();

        let request = form.bind_client("7").unwrap().expect("estimate expected");
        assert_eq!(request.client_id(), client(7));
        assert_eq!(request.payload().coverage_amount, dec!(100000));
    }

    #[test]
    fn test_rebinding_same_client_does_not_trigger() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);
        assert!(form.bind_client("7").unwrap().is_none());
        assert!(form.bind_client("8").unwrap().is_some());
    }

    #[test]
    fn test_type_change_triggers_and_snapshots_new_type() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);

        let request = form.set_field("policyType", "WHOLE_LIFE").unwrap().unwrap();
        assert_eq!(request.payload().policy_type(), PolicyType::WholeLife);
    }

    #[test]
    fn test_other_fields_do_not_trigger() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);
        assert!(form.set_field("startDate", "2025-01-01").unwrap().is_none());
        assert!(form.set_field("termYears", "30").unwrap().is_none());
        assert!(form.set_field("convertible", "yes").unwrap().is_none());
    }

    #[test]
    fn test_unknown_field_and_type_rejected() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);

        assert!(matches!(
            form.set_field("premiumAmount", "10"),
            Err(PolicyFormError::UnknownField(_))
        ));
        assert!(matches!(
            form.set_field("policyType", "HOMEOWNERS"),
            Err(PolicyFormError::UnknownPolicyType(_))
        ));
        assert_eq!(form.draft().policy_type, PolicyType::TermLife);
    }
}

// ============================================================================
// Estimate ordering
// ============================================================================

mod estimate_ordering {
    use super::*;

    #[tokio::test]
    async fn test_last_issued_wins_when_earlier_resolves_late() {
        let port = Arc::new(MockPolicyPort::new());
        port.queue_estimate(Ok(dec!(11))).await;
        port.queue_estimate(Ok(dec!(22))).await;

        let mut form = filled_form(&port);
        let a = form.request_estimate().unwrap();
        let b = form.set_field("coverageAmount", "200000").unwrap().unwrap();
        assert!(b.sequence() > a.sequence());

        let response_a = a.send().await;
        let response_b = b.send().await;

        assert_eq!(form.apply_estimate(response_b), EstimateOutcome::Updated(dec!(22)));
        assert_eq!(form.apply_estimate(response_a), EstimateOutcome::Superseded);
        assert_eq!(form.estimate(), Some(dec!(22)));
    }

    #[tokio::test]
    async fn test_requests_can_run_concurrently() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);

        let a = form.request_estimate().unwrap();
        let b = form.set_field("coverageAmount", "300000").unwrap().unwrap();
        let (response_a, response_b) = tokio::join!(
            tokio::spawn(a.send()),
            tokio::spawn(b.send()),
        );

        assert_eq!(form.apply_estimate(response_a.unwrap()), EstimateOutcome::Superseded);
        assert_eq!(
            form.apply_estimate(response_b.unwrap()),
            EstimateOutcome::Updated(dec!(150))
        );
        assert_eq!(port.estimate_calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_estimate() {
        let port = Arc::new(MockPolicyPort::new());
        port.queue_estimate(Ok(dec!(45.10))).await;
        port.queue_estimate(Err(PortError::connection("refused"))).await;

        let mut form = filled_form(&port);
        form.refresh_estimate().await;
        let outcome = form.refresh_estimate().await;

        assert_eq!(
            outcome,
            Some(EstimateOutcome::Failed(ESTIMATE_FAILED_MESSAGE.to_string()))
        );
        assert_eq!(form.estimate(), Some(dec!(45.10)));
        assert_eq!(form.error(), Some(ESTIMATE_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_failure_prefers_server_message() {
        let port = Arc::new(MockPolicyPort::new());
        port.queue_estimate(Err(PortError::rejected(
            400,
            Some("Coverage amount must be greater than 0".into()),
        )))
        .await;

        let mut form = filled_form(&port);
        form.refresh_estimate().await;
        assert_eq!(form.error(), Some("Coverage amount must be greater than 0"));
    }

    #[tokio::test]
    async fn test_stale_failure_records_nothing() {
        let port = Arc::new(MockPolicyPort::new());
        port.queue_estimate(Err(PortError::connection("refused"))).await;
        port.queue_estimate(Ok(dec!(80))).await;

        let mut form = filled_form(&port);
        let a = form.request_estimate().unwrap();
        let b = form.request_estimate().unwrap();
        let response_a = a.send().await;
        let response_b = b.send().await;

        assert_eq!(form.apply_estimate(response_a), EstimateOutcome::Superseded);
        assert_eq!(form.error(), None);
        assert_eq!(form.apply_estimate(response_b), EstimateOutcome::Updated(dec!(80)));
    }

    #[tokio::test]
    async fn test_success_clears_estimate_error() {
        let port = Arc::new(MockPolicyPort::new());
        port.queue_estimate(Err(PortError::connection("refused"))).await;

        let mut form = filled_form(&port);
        form.refresh_estimate().await;
        assert!(form.error().is_some());

        form.refresh_estimate().await;
        assert_eq!(form.error(), None);
        assert_eq!(form.estimate(), Some(dec!(50)));
    }

    #[tokio::test]
    async fn test_changing_client_discards_in_flight_estimate() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);

        let a = form.request_estimate().unwrap();
        form.set_field("coverageAmount", "0").unwrap();
        form.bind_client("8").unwrap();

        assert_eq!(form.apply_estimate(a.send().await), EstimateOutcome::Superseded);
        assert_eq!(form.estimate(), None);
    }

    #[tokio::test]
    async fn test_clearing_coverage_discards_in_flight_estimate() {
        let port = Arc::new(MockPolicyPort::new());
        port.queue_estimate(Ok(dec!(40))).await;
        port.queue_estimate(Ok(dec!(99))).await;

        let mut form = filled_form(&port);
        form.refresh_estimate().await;

        let in_flight = form.set_field("coverageAmount", "200000").unwrap().unwrap();
        assert!(form.set_field("coverageAmount", "0").unwrap().is_none());

        assert_eq!(
            form.apply_estimate(in_flight.send().await),
            EstimateOutcome::Superseded
        );
        assert_eq!(form.estimate(), Some(dec!(40)));
    }
}

// ============================================================================
// Submission
// ============================================================================

mod submission {
    use super::*;

    #[tokio::test]
    async fn test_submit_creates_and_resets_draft() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);

        let policy = form.submit().await.unwrap();
        assert!(policy.id.is_some());
        assert_eq!(policy.policy_type, Some(PolicyType::TermLife));
        assert_eq!(policy.term_years, Some(20));

        assert_eq!(form.client_id(), Some(client(7)));
        assert_eq!(form.draft().coverage_amount, dec!(0));
        assert!(form.draft().beneficiary_name.is_empty());
        assert_eq!(port.policies_for(client(7)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_service() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);
        form.set_field("beneficiaryName", "   ").unwrap();

        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, PolicyFormError::Validation(_)));
        assert_eq!(form.error(), Some("Beneficiary name is required"));
        assert!(port.create_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_unbound_form_fails_validation() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = open_form(&port);
        let _ = form.bind_client("-4");

        let err = form.submit().await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid client ID");
    }

    #[tokio::test]
    async fn test_double_submit_rejected_while_in_flight() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);

        let first = form.begin_submit().unwrap();
        assert!(form.is_submitting());
        assert!(matches!(
            form.begin_submit(),
            Err(PolicyFormError::SubmissionInProgress)
        ));

        let response = first.send().await;
        form.finish_submit(response).unwrap();
        assert!(!form.is_submitting());
        assert_eq!(port.create_calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_preserves_draft_and_uses_server_message() {
        let port = Arc::new(MockPolicyPort::with_clients([client(1)]));
        let mut form = filled_form(&port);

        let err = form.submit().await.unwrap_err();
        assert_eq!(err.user_message(), "Client not found with ID: 7");
        assert_eq!(form.error(), Some("Client not found with ID: 7"));
        assert_eq!(form.draft().coverage_amount, dec!(100000));
        assert_eq!(form.draft().beneficiary_name, "Jane Doe");
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_failure_without_message_is_generic() {
        let port = Arc::new(MockPolicyPort::new());
        port.fail_next_create(PortError::ServiceUnavailable {
            service: "crm".to_string(),
            message: None,
        })
        .await;
        let mut form = filled_form(&port);

        let err = form.submit().await.unwrap_err();
        assert_eq!(err.user_message(), CREATE_FAILED_MESSAGE);

        // Retry without re-entering anything
        assert!(form.submit().await.is_ok());
    }

    #[tokio::test]
    async fn test_created_record_without_id_is_a_failure() {
        let port = Arc::new(MockPolicyPort::new().without_ids());
        let mut form = filled_form(&port);

        let err = form.submit().await.unwrap_err();
        assert_eq!(err.user_message(), CREATE_FAILED_MESSAGE);
        assert_eq!(form.draft().coverage_amount, dec!(100000));
    }

    #[tokio::test]
    async fn test_submitted_payload_excludes_stale_fields() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);
        form.set_field("convertible", "true").unwrap();
        form.set_field("policyType", "VARIABLE_LIFE").unwrap();
        form.set_field("investmentComponent", "1000").unwrap();

        form.submit().await.unwrap();

        let calls = port.create_calls().await;
        let json = serde_json::to_value(&calls[0].1).unwrap();
        assert_eq!(json["policyType"], "VARIABLE_LIFE");
        assert_eq!(json["investmentComponent"], 1000.0);
        assert!(json.get("termYears").is_none());
        assert!(json.get("convertible").is_none());
    }

    #[tokio::test]
    async fn test_dropped_request_reopens_submission() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);

        let abandoned = form.begin_submit().unwrap();
        assert!(form.is_submitting());
        drop(abandoned);
        assert!(!form.is_submitting());

        assert!(form.submit().await.is_ok());
        assert_eq!(port.create_calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_response_reopens_submission() {
        let port = Arc::new(MockPolicyPort::new());
        let mut form = filled_form(&port);

        let response = form.begin_submit().unwrap().send().await;
        assert!(form.is_submitting());
        drop(response);

        assert!(!form.is_submitting());
        assert!(form.begin_submit().is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_submit_reopens_submission() {
        let draft = filled_form(&Arc::new(MockPolicyPort::new())).draft().clone();
        let mut stalled = PolicyFormController::with_draft(Arc::new(StalledPolicyPort), draft);
        stalled.bind_client("7").unwrap();

        let timed_out = tokio::time::timeout(Duration::from_millis(50), stalled.submit()).await;
        assert!(timed_out.is_err());

        assert!(!stalled.is_submitting());
        assert!(stalled.begin_submit().is_ok());
    }
}
