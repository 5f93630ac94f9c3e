//! New-policy form controller
//!
//! [`PolicyFormController`] owns the [`PolicyDraft`] for one client and is
//! the only thing that mutates it. Service calls are split in two so the
//! controller is never borrowed across an await:
//!
//! ```text
//! set_field ──► Option<EstimateRequest> ──send()──► EstimateResponse ──► apply_estimate
//! begin_submit ──► SubmitRequest ──send()──► SubmitResponse ──► finish_submit
//! ```
//!
//! Every estimate request carries a sequence number. Only the response to
//! the most recently issued request is applied; anything older is dropped
//! no matter when it arrives.
//!
//! The submitting flag lives as long as the [`SubmitRequest`] and its
//! [`SubmitResponse`]. Dropping either one, or cancelling the future that
//! holds them, re-opens the form for submission.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use core_kernel::{ClientId, OperationMetadata, PortError};

use crate::draft::{PolicyDraft, PolicyField};
use crate::error::{PolicyFormError, CREATE_FAILED_MESSAGE, ESTIMATE_FAILED_MESSAGE};
use crate::policy::Policy;
use crate::policy_type::FieldApplicability;
use crate::ports::PolicyPort;
use crate::terms::PolicyRequest;
use crate::validation::{PolicyValidator, ValidationReport};

/// An estimate call issued by the controller, not yet sent
pub struct EstimateRequest {
    sequence: u64,
    client_id: ClientId,
    payload: PolicyRequest,
    port: Arc<dyn PolicyPort>,
}

impl fmt::Debug for EstimateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EstimateRequest")
            .field("sequence", &self.sequence)
            .field("client_id", &self.client_id)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

impl EstimateRequest {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn payload(&self) -> &PolicyRequest {
        &self.payload
    }

    /// Calls the policy service
    pub async fn send(self) -> EstimateResponse {
        let metadata = OperationMetadata::correlated();
        debug!(
            sequence = self.sequence,
            correlation_id = ?metadata.correlation_id,
            "Requesting premium estimate"
        );
        let result = self
            .port
            .estimate_premium(self.client_id, &self.payload, Some(metadata))
            .await;
        EstimateResponse {
            sequence: self.sequence,
            result,
        }
    }
}

/// A completed estimate call, to be handed back to the controller
#[derive(Debug)]
pub struct EstimateResponse {
    sequence: u64,
    result: Result<Decimal, PortError>,
}

impl EstimateResponse {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// What applying an estimate response did to the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimateOutcome {
    /// The displayed estimate was replaced
    Updated(Decimal),
    /// The call failed; the previous estimate stays visible
    Failed(String),
    /// A newer request had been issued; the response was dropped
    Superseded,
}

/// Clears the controller's submitting flag when dropped
#[derive(Debug)]
struct SubmitGuard(Arc<AtomicBool>);

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A policy creation call, not yet sent
pub struct SubmitRequest {
    client_id: ClientId,
    payload: PolicyRequest,
    port: Arc<dyn PolicyPort>,
    guard: SubmitGuard,
}

impl fmt::Debug for SubmitRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitRequest")
            .field("client_id", &self.client_id)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

impl SubmitRequest {
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn payload(&self) -> &PolicyRequest {
        &self.payload
    }

    /// Calls the policy service; creation carries no timeout of its own
    pub async fn send(self) -> SubmitResponse {
        let SubmitRequest {
            client_id,
            payload,
            port,
            guard,
        } = self;
        let result = port
            .create_policy(client_id, &payload, Some(OperationMetadata::correlated()))
            .await;
        SubmitResponse { result, guard }
    }
}

/// A completed creation call
#[derive(Debug)]
pub struct SubmitResponse {
    result: Result<Policy, PortError>,
    guard: SubmitGuard,
}

/// State machine behind the add-policy form
pub struct PolicyFormController {
    port: Arc<dyn PolicyPort>,
    client_id: Option<ClientId>,
    draft: PolicyDraft,
    estimate: Option<Decimal>,
    estimate_error: Option<String>,
    error: Option<String>,
    issued: u64,
    submitting: Arc<AtomicBool>,
}

impl PolicyFormController {
    /// Opens the form with a default draft starting today
    pub fn new(port: Arc<dyn PolicyPort>) -> Self {
        Self::with_draft(port, PolicyDraft::starting_today())
    }

    /// Opens the form on an existing draft
    pub fn with_draft(port: Arc<dyn PolicyPort>, draft: PolicyDraft) -> Self {
        Self {
            port,
            client_id: None,
            draft,
            estimate: None,
            estimate_error: None,
            error: None,
            issued: 0,
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Binds the form to the client named by a route parameter
    ///
    /// An unparseable or non-positive id leaves the form unbound and records
    /// `Invalid client ID`. A change of client re-triggers the estimate.
    pub fn bind_client(&mut self, raw_id: &str) -> Result<Option<EstimateRequest>, PolicyFormError> {
        let client_id = match raw_id.parse::<ClientId>() {
            Ok(id) => id,
            Err(e) => {
                debug!(raw_id, error = %e, "Rejected client reference");
                if self.client_id.take().is_some() {
                    self.invalidate_estimate();
                }
                let err = PolicyFormError::InvalidClientId(raw_id.trim().to_string());
                self.error = Some(err.user_message());
                return Err(err);
            }
        };

        if self.client_id == Some(client_id) {
            return Ok(None);
        }
        if self.client_id.replace(client_id).is_some() {
            self.invalidate_estimate();
        }
        self.error = None;
        Ok(self.request_estimate())
    }

    /// Stores raw input for a field named by its wire name
    pub fn set_field(
        &mut self,
        name: &str,
        raw_value: &str,
    ) -> Result<Option<EstimateRequest>, PolicyFormError> {
        let field: PolicyField = name.parse()?;
        self.set(field, raw_value)
    }

    /// Stores raw input for a field
    ///
    /// Returns an estimate request when coverage or policy type actually
    /// changed and an estimate is possible. A change that makes an estimate
    /// impossible still supersedes any request in flight.
    pub fn set(
        &mut self,
        field: PolicyField,
        raw_value: &str,
    ) -> Result<Option<EstimateRequest>, PolicyFormError> {
        let changed = self.draft.apply(field, raw_value)?;
        if !(changed && field.affects_estimate()) {
            return Ok(None);
        }
        let request = self.request_estimate();
        if request.is_none() {
            self.issued += 1;
        }
        Ok(request)
    }

    // ========================================================================
    // Premium estimate
    // ========================================================================

    /// Issues an estimate request for the current draft
    ///
    /// Returns `None` unless a client is bound and coverage is positive.
    /// Issuing supersedes every request issued before it.
    pub fn request_estimate(&mut self) -> Option<EstimateRequest> {
        let client_id = self.client_id?;
        if self.draft.coverage_amount <= Decimal::ZERO {
            return None;
        }

        self.issued += 1;
        Some(EstimateRequest {
            sequence: self.issued,
            client_id,
            payload: PolicyRequest::from_draft(&self.draft),
            port: Arc::clone(&self.port),
        })
    }

    /// Applies a completed estimate if it answers the latest request
    pub fn apply_estimate(&mut self, response: EstimateResponse) -> EstimateOutcome {
        if response.sequence != self.issued {
            debug!(
                sequence = response.sequence,
                latest = self.issued,
                "Discarding superseded premium estimate"
            );
            return EstimateOutcome::Superseded;
        }

        match response.result {
            Ok(premium) => {
                self.estimate = Some(premium);
                self.estimate_error = None;
                EstimateOutcome::Updated(premium)
            }
            Err(e) => {
                warn!(
                    client_id = ?self.client_id,
                    sequence = response.sequence,
                    error = %e,
                    "Premium estimate failed"
                );
                let message = PolicyFormError::service(e, ESTIMATE_FAILED_MESSAGE).user_message();
                self.estimate_error = Some(message.clone());
                EstimateOutcome::Failed(message)
            }
        }
    }

    /// Issues, sends, and applies an estimate in one step
    pub async fn refresh_estimate(&mut self) -> Option<EstimateOutcome> {
        let request = self.request_estimate()?;
        let response = request.send().await;
        Some(self.apply_estimate(response))
    }

    fn invalidate_estimate(&mut self) {
        self.issued += 1;
        self.estimate = None;
        self.estimate_error = None;
    }

    // ========================================================================
    // Validation and submission
    // ========================================================================

    /// Checks the draft against every rule without touching the form
    pub fn validate(&self) -> ValidationReport {
        PolicyValidator::validate(self.client_id, &self.draft)
    }

    /// Starts a submission
    ///
    /// Fails without contacting the service when a submission is already in
    /// flight or the draft is invalid. On success the form is marked as
    /// submitting until the request, or the response it turns into, is
    /// handed to [`PolicyFormController::finish_submit`] or dropped.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, PolicyFormError> {
        if self.is_submitting() {
            return Err(PolicyFormError::SubmissionInProgress);
        }

        let report = self.validate();
        let client_id = match self.client_id {
            Some(client_id) if report.is_valid() => client_id,
            _ => {
                let err = PolicyFormError::Validation(report);
                self.error = Some(err.user_message());
                return Err(err);
            }
        };

        self.submitting.store(true, Ordering::Release);
        self.error = None;
        Ok(SubmitRequest {
            client_id,
            payload: PolicyRequest::from_draft(&self.draft),
            port: Arc::clone(&self.port),
            guard: SubmitGuard(Arc::clone(&self.submitting)),
        })
    }

    /// Completes a submission started by `begin_submit`
    ///
    /// Success discards the draft (the client binding is kept). Failure
    /// keeps the draft so the user can retry.
    pub fn finish_submit(&mut self, response: SubmitResponse) -> Result<Policy, PolicyFormError> {
        let SubmitResponse { result, guard } = response;
        drop(guard);

        let outcome = result.and_then(|policy| match policy.id {
            Some(_) => Ok(policy),
            None => Err(PortError::Transformation {
                message: "Created policy has no id".to_string(),
            }),
        });

        match outcome {
            Ok(policy) => {
                info!(
                    client_id = ?self.client_id,
                    policy_id = ?policy.id,
                    policy_type = ?policy.policy_type,
                    "Policy created"
                );
                self.draft = PolicyDraft::starting_today();
                self.invalidate_estimate();
                self.error = None;
                Ok(policy)
            }
            Err(e) => {
                warn!(client_id = ?self.client_id, error = %e, "Policy creation failed");
                let err = PolicyFormError::service(e, CREATE_FAILED_MESSAGE);
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Validates, creates the policy, and applies the result
    pub async fn submit(&mut self) -> Result<Policy, PolicyFormError> {
        let request = self.begin_submit()?;
        let response = request.send().await;
        self.finish_submit(response)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    pub fn draft(&self) -> &PolicyDraft {
        &self.draft
    }

    /// The latest successful estimate
    pub fn estimate(&self) -> Option<Decimal> {
        self.estimate
    }

    /// The message currently shown to the user, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().or(self.estimate_error.as_deref())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Which type-specific fields the form currently shows
    pub fn applicability(&self) -> FieldApplicability {
        self.draft.policy_type.applicability()
    }

    /// The payload a submission would send right now
    pub fn payload(&self) -> PolicyRequest {
        PolicyRequest::from_draft(&self.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockPolicyPort;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn controller(port: Arc<MockPolicyPort>) -> PolicyFormController {
        let draft = PolicyDraft::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        PolicyFormController::with_draft(port, draft)
    }

    #[test]
    fn test_no_estimate_without_client() {
        let mut form = controller(Arc::new(MockPolicyPort::new()));
        assert!(form.set_field("coverageAmount", "100000").unwrap().is_none());
    }

    #[test]
    fn test_no_estimate_for_zero_coverage() {
        let mut form = controller(Arc::new(MockPolicyPort::new()));
        form.bind_client("1").unwrap();
        assert!(form.set_field("coverageAmount", "abc").unwrap().is_none());
        assert!(form.set_field("policyType", "WHOLE_LIFE").unwrap().is_none());
    }

    #[test]
    fn test_unchanged_value_does_not_retrigger() {
        let mut form = controller(Arc::new(MockPolicyPort::new()));
        form.bind_client("1").unwrap();
        assert!(form.set_field("coverageAmount", "5000").unwrap().is_some());
        assert!(form.set_field("coverageAmount", "5000").unwrap().is_none());
        assert!(form.set_field("beneficiaryName", "Jane").unwrap().is_none());
    }

    #[test]
    fn test_invalid_client_reference() {
        let mut form = controller(Arc::new(MockPolicyPort::new()));
        let result = form.bind_client("abc");
        assert!(matches!(result, Err(PolicyFormError::InvalidClientId(_))));
        assert_eq!(form.error(), Some("Invalid client ID"));
        assert_eq!(form.client_id(), None);
    }

    #[tokio::test]
    async fn test_refresh_estimate_updates() {
        let mut form = controller(Arc::new(MockPolicyPort::new()));
        form.bind_client("1").unwrap();
        form.set_field("coverageAmount", "200000").unwrap();

        let outcome = form.refresh_estimate().await;
        assert_eq!(outcome, Some(EstimateOutcome::Updated(dec!(100))));
        assert_eq!(form.estimate(), Some(dec!(100)));
    }
}
