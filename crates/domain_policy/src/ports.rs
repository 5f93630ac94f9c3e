//! Policy Domain Ports
//!
//! This module defines the port through which the policy form reaches the
//! policy service. The form controller only ever holds an
//! `Arc<dyn PolicyPort>`, so the HTTP adapter in `infra_http` and the
//! in-memory mock below are interchangeable.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_policy::{PolicyFormController, PolicyPort};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn PolicyPort> = Arc::new(CrmApiClient::new(config)?);
//! let mut form = PolicyFormController::new(port);
//! form.bind_client("42")?;
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;

use core_kernel::{ClientId, DomainPort, OperationMetadata, PolicyId, PortError};

use crate::policy::Policy;
use crate::terms::PolicyRequest;

/// Operations the policy domain needs from the policy service
#[async_trait]
pub trait PolicyPort: DomainPort {
    /// Asks the service for the premium a draft would cost
    ///
    /// # Arguments
    ///
    /// * `client_id` - The client the policy would belong to
    /// * `request` - Snapshot of the draft, type-specific fields included
    /// * `metadata` - Optional operation metadata for tracing
    ///
    /// # Returns
    ///
    /// The estimated premium amount
    async fn estimate_premium(
        &self,
        client_id: ClientId,
        request: &PolicyRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Decimal, PortError>;

    /// Creates a policy for a client
    ///
    /// # Returns
    ///
    /// The stored record; a well-behaved service assigns its `id`
    async fn create_policy(
        &self,
        client_id: ClientId,
        request: &PolicyRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Policy, PortError>;

    /// Replaces an existing policy record
    async fn update_policy(
        &self,
        id: PolicyId,
        policy: &Policy,
        metadata: Option<OperationMetadata>,
    ) -> Result<Policy, PortError>;
}

/// Mock implementation of PolicyPort for testing
///
/// Available in tests and when the `mock` feature is enabled.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Premium charged per unit of coverage when no result is queued
    pub const DEFAULT_RATE: Decimal = dec!(0.0005);

    /// In-memory mock implementation of PolicyPort
    ///
    /// Estimates default to `coverage * DEFAULT_RATE`; queued results are
    /// returned first, in order.
    #[derive(Debug)]
    pub struct MockPolicyPort {
        policies: Arc<RwLock<HashMap<PolicyId, (ClientId, Policy)>>>,
        known_clients: Option<HashSet<ClientId>>,
        estimate_results: Arc<RwLock<VecDeque<Result<Decimal, PortError>>>>,
        create_failures: Arc<RwLock<VecDeque<PortError>>>,
        estimate_calls: Arc<RwLock<Vec<(ClientId, PolicyRequest)>>>,
        create_calls: Arc<RwLock<Vec<(ClientId, PolicyRequest)>>>,
        next_id: AtomicI64,
        assign_ids: bool,
    }

    impl Default for MockPolicyPort {
        fn default() -> Self {
            Self {
                policies: Arc::default(),
                known_clients: None,
                estimate_results: Arc::default(),
                create_failures: Arc::default(),
                estimate_calls: Arc::default(),
                create_calls: Arc::default(),
                next_id: AtomicI64::new(1),
                assign_ids: true,
            }
        }
    }

    impl MockPolicyPort {
        /// Creates a mock that accepts any client
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a mock that rejects clients outside `clients`, as the
        /// service does
        pub fn with_clients(clients: impl IntoIterator<Item = ClientId>) -> Self {
            Self {
                known_clients: Some(clients.into_iter().collect()),
                ..Self::default()
            }
        }

        /// Makes created records come back without an id
        pub fn without_ids(mut self) -> Self {
            self.assign_ids = false;
            self
        }

        /// Queues the result of a future estimate call
        pub async fn queue_estimate(&self, result: Result<Decimal, PortError>) {
            self.estimate_results.write().await.push_back(result);
        }

        /// Makes the next create call fail with `error`
        pub async fn fail_next_create(&self, error: PortError) {
            self.create_failures.write().await.push_back(error);
        }

        /// Requests received by `estimate_premium`, in call order
        pub async fn estimate_calls(&self) -> Vec<(ClientId, PolicyRequest)> {
            self.estimate_calls.read().await.clone()
        }

        /// Requests received by `create_policy`, in call order
        pub async fn create_calls(&self) -> Vec<(ClientId, PolicyRequest)> {
            self.create_calls.read().await.clone()
        }

        /// Policies stored for a client
        pub async fn policies_for(&self, client_id: ClientId) -> Vec<Policy> {
            let mut policies: Vec<_> = self
                .policies
                .read()
                .await
                .values()
                .filter(|(owner, _)| *owner == client_id)
                .map(|(_, policy)| policy.clone())
                .collect();
            policies.sort_by_key(|p| p.id);
            policies
        }

        fn check_client(&self, client_id: ClientId) -> Result<(), PortError> {
            match &self.known_clients {
                Some(known) if !known.contains(&client_id) => Err(PortError::rejected(
                    400,
                    Some(format!("Client not found with ID: {client_id}")),
                )),
                _ => Ok(()),
            }
        }

        fn to_record(&self, request: &PolicyRequest) -> Result<Policy, PortError> {
            let value = serde_json::to_value(request)
                .map_err(|e| PortError::internal(e.to_string()))?;
            serde_json::from_value(value).map_err(|e| PortError::Transformation {
                message: e.to_string(),
            })
        }
    }

    impl DomainPort for MockPolicyPort {}

    #[async_trait]
    impl PolicyPort for MockPolicyPort {
        async fn estimate_premium(
            &self,
            client_id: ClientId,
            request: &PolicyRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Decimal, PortError> {
            self.estimate_calls
                .write()
                .await
                .push((client_id, request.clone()));
            self.check_client(client_id)?;

            match self.estimate_results.write().await.pop_front() {
                Some(result) => result,
                None => Ok((request.coverage_amount * DEFAULT_RATE).round_dp(2)),
            }
        }

        async fn create_policy(
            &self,
            client_id: ClientId,
            request: &PolicyRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Policy, PortError> {
            self.create_calls
                .write()
                .await
                .push((client_id, request.clone()));
            if let Some(error) = self.create_failures.write().await.pop_front() {
                return Err(error);
            }
            self.check_client(client_id)?;

            let mut policy = self.to_record(request)?;
            policy.premium_amount = Some((request.coverage_amount * DEFAULT_RATE).round_dp(2));
            policy.end_date = policy.expected_end_date();

            if !self.assign_ids {
                return Ok(policy);
            }
            let id = PolicyId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
                .map_err(|e| PortError::internal(e.to_string()))?;
            policy.id = Some(id);
            self.policies
                .write()
                .await
                .insert(id, (client_id, policy.clone()));
            Ok(policy)
        }

        async fn update_policy(
            &self,
            id: PolicyId,
            policy: &Policy,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Policy, PortError> {
            let mut policies = self.policies.write().await;
            let (_, stored) = policies
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Policy", id))?;
            *stored = Policy {
                id: Some(id),
                ..policy.clone()
            };
            Ok(stored.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockPolicyPort;
    use super::*;
    use crate::draft::{PolicyDraft, PolicyField};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn request(coverage: &str) -> PolicyRequest {
        let mut draft = PolicyDraft::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        draft.apply(PolicyField::CoverageAmount, coverage).unwrap();
        draft.apply(PolicyField::TermYears, "20").unwrap();
        PolicyRequest::from_draft(&draft)
    }

    fn client(id: i64) -> ClientId {
        ClientId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_mock_default_estimate() {
        let port = MockPolicyPort::new();
        let premium = port
            .estimate_premium(client(1), &request("100000"), None)
            .await
            .unwrap();
        assert_eq!(premium, dec!(50));
    }

    #[tokio::test]
    async fn test_mock_create_assigns_id_and_end_date() {
        let port = MockPolicyPort::new();
        let created = port.create_policy(client(1), &request("100000"), None).await.unwrap();

        assert!(created.id.is_some());
        assert_eq!(created.end_date, NaiveDate::from_ymd_opt(2044, 1, 1));
        assert_eq!(port.policies_for(client(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_rejects_unknown_client() {
        let port = MockPolicyPort::with_clients([client(1)]);
        let err = port
            .create_policy(client(2), &request("100000"), None)
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Client not found with ID: 2"));
    }

    #[tokio::test]
    async fn test_mock_update_unknown_policy() {
        let port = MockPolicyPort::new();
        let err = port
            .update_policy(PolicyId::new(99).unwrap(), &Policy::default(), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
