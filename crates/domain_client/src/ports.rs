//! Client Domain Ports
//!
//! This module defines the port interface through which views and forms reach
//! client data. Implementations:
//!
//! - **HTTP Adapter**: `infra_http::CrmApiClient`, talking to the CRM service
//! - **Mock Adapter**: in-memory, for tests (feature `mock`)

use async_trait::async_trait;

use core_kernel::{ClientId, DomainPort, OperationMetadata, PortError};

use crate::client::{Client, NewClient};

/// Operations the client views need from the CRM service
#[async_trait]
pub trait ClientPort: DomainPort {
    /// Lists every client
    ///
    /// Implementations substitute an empty list when the service answers
    /// with something other than an array.
    async fn list_clients(
        &self,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Client>, PortError>;

    /// Retrieves a client with its policies
    ///
    /// # Returns
    ///
    /// The client if found, or `PortError::NotFound`
    async fn get_client(
        &self,
        id: ClientId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Client, PortError>;

    /// Creates a client
    ///
    /// # Returns
    ///
    /// The stored record; a well-behaved service assigns its `id`
    async fn create_client(
        &self,
        client: &NewClient,
        metadata: Option<OperationMetadata>,
    ) -> Result<Client, PortError>;
}

/// Mock implementation of ClientPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of ClientPort
    #[derive(Debug)]
    pub struct MockClientPort {
        clients: Arc<RwLock<BTreeMap<ClientId, Client>>>,
        failures: Arc<RwLock<VecDeque<PortError>>>,
        created: Arc<RwLock<Vec<NewClient>>>,
        next_id: AtomicI64,
        assign_ids: bool,
    }

    impl Default for MockClientPort {
        fn default() -> Self {
            Self {
                clients: Arc::default(),
                failures: Arc::default(),
                created: Arc::default(),
                next_id: AtomicI64::new(1),
                assign_ids: true,
            }
        }
    }

    impl MockClientPort {
        /// Creates an empty mock
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with clients; records without an id are given one
        pub async fn with_clients(clients: Vec<Client>) -> Self {
            let port = Self::new();
            for mut client in clients {
                let Some(id) = client.id.or_else(|| port.allocate_id().ok()) else {
                    continue;
                };
                port.next_id.fetch_max(id.get().saturating_add(1), Ordering::SeqCst);
                client.id = Some(id);
                port.clients.write().await.insert(id, client);
            }
            port
        }

        /// Makes created records come back without an id
        pub fn without_ids(mut self) -> Self {
            self.assign_ids = false;
            self
        }

        /// Makes the next call of any kind fail with `error`
        pub async fn fail_next(&self, error: PortError) {
            self.failures.write().await.push_back(error);
        }

        /// Payloads received by `create_client`, in call order
        pub async fn created(&self) -> Vec<NewClient> {
            self.created.read().await.clone()
        }

        fn allocate_id(&self) -> Result<ClientId, PortError> {
            ClientId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
                .map_err(|e| PortError::internal(e.to_string()))
        }

        async fn take_failure(&self) -> Result<(), PortError> {
            match self.failures.write().await.pop_front() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    impl DomainPort for MockClientPort {}

    #[async_trait]
    impl ClientPort for MockClientPort {
        async fn list_clients(
            &self,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Client>, PortError> {
            self.take_failure().await?;
            Ok(self.clients.read().await.values().cloned().collect())
        }

        async fn get_client(
            &self,
            id: ClientId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Client, PortError> {
            self.take_failure().await?;
            self.clients
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Client", id))
        }

        async fn create_client(
            &self,
            client: &NewClient,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Client, PortError> {
            self.created.write().await.push(client.clone());
            self.take_failure().await?;

            let mut record = Client {
                id: None,
                first_name: Some(client.first_name.clone()),
                last_name: Some(client.last_name.clone()),
                email: Some(client.email.clone()),
                phone: Some(client.phone.clone()).filter(|p| !p.is_empty()),
                date_of_birth: client.parsed_date_of_birth(),
                address: Some(client.address.clone()).filter(|a| !a.is_empty()),
                occupation: Some(client.occupation.clone()).filter(|o| !o.is_empty()),
                annual_income: Some(client.annual_income),
                policies: Some(Vec::new()),
            };
            if !self.assign_ids {
                return Ok(record);
            }

            let id = self.allocate_id()?;
            record.id = Some(id);
            self.clients.write().await.insert(id, record.clone());
            Ok(record)
        }
    }
}
