//! reqwest adapter for the CRM REST service
//!
//! Implements [`ClientPort`] and [`PolicyPort`] over the service's JSON API:
//!
//! | Operation | Request |
//! |---|---|
//! | `list_clients` | `GET {base}/clients` |
//! | `get_client` | `GET {base}/clients/{id}` |
//! | `create_client` | `POST {base}/clients` |
//! | `estimate_premium` | `POST {base}/calculate-premium?clientId={id}` |
//! | `create_policy` | `POST {base}/clients/{id}/policies` |
//! | `update_policy` | `PUT {base}/policies/{id}` |
//!
//! Reads are retried on transient failures; writes are sent exactly once.
//! Policy creation carries no timeout, every other call uses the configured one.

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use core_kernel::{ClientId, CoreError, DomainPort, OperationMetadata, PolicyId, PortError};
use domain_client::{Client, ClientPort, NewClient};
use domain_policy::{Policy, PolicyPort, PolicyRequest};

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::config::ApiClientConfig;
use crate::error::{decode_error, status_error, transport_error, Target};

/// Header carrying the caller's correlation id
pub const CORRELATION_HEADER: &str = "X-Correlation-ID";

/// A single logical request, possibly sent more than once
struct Call {
    method: Method,
    path: String,
    target: Target,
    body: Option<serde_json::Value>,
    query: Vec<(&'static str, String)>,
    timed: bool,
}

impl Call {
    fn new(method: Method, path: impl Into<String>, target: Target) -> Self {
        Self {
            method,
            path: path.into(),
            target,
            body: None,
            query: Vec::new(),
            timed: true,
        }
    }

    fn json(mut self, body: &impl Serialize) -> Result<Self, PortError> {
        let value = serde_json::to_value(body).map_err(|e| PortError::Transformation {
            message: format!("{}: could not encode request: {}", self.target.operation, e),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn untimed(mut self) -> Self {
        self.timed = false;
        self
    }
}

/// HTTP client for the CRM service
#[derive(Debug, Clone)]
pub struct CrmApiClient {
    http: reqwest::Client,
    config: ApiClientConfig,
    base_url: String,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
}

impl CrmApiClient {
    /// Creates a client from validated configuration
    pub fn new(config: ApiClientConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("insurance-crm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::configuration(format!("Failed to build HTTP client: {e}")))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let circuit_breaker = config
            .circuit_breaker()
            .map(|cb| Arc::new(CircuitBreaker::new(cb)));

        Ok(Self {
            http,
            config,
            base_url,
            circuit_breaker,
        })
    }

    /// Creates a client from `CRM_*` environment variables
    pub fn from_env() -> Result<Self, CoreError> {
        let config = ApiClientConfig::from_env()
            .map_err(|e| CoreError::configuration(e.to_string()))?;
        Self::new(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Returns true while the circuit breaker is rejecting calls
    pub async fn is_circuit_open(&self) -> bool {
        match &self.circuit_breaker {
            Some(cb) => cb.state().await == CircuitState::Open,
            None => false,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends a call, retrying reads on transient failures
    async fn execute(
        &self,
        call: Call,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<u8>, PortError> {
        let correlation_id = metadata.unwrap_or_default().correlation_id_or_new();
        let max_attempts = if call.method == Method::GET {
            self.config.retry_attempts.saturating_add(1)
        } else {
            1
        };

        let mut attempt = 0;
        loop {
            attempt += 1;

            if let Some(cb) = &self.circuit_breaker {
                cb.check(&self.config.service_name).await?;
            }

            let result = self.send_once(&call, &correlation_id).await;

            if let Some(cb) = &self.circuit_breaker {
                match &result {
                    Err(e) if e.is_transient() => cb.record_failure().await,
                    _ => cb.record_success(),
                }
            }

            match result {
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.config.backoff(attempt);
                    warn!(
                        operation = call.target.operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn send_once(&self, call: &Call, correlation_id: &str) -> Result<Vec<u8>, PortError> {
        let url = self.url(&call.path);
        debug!(method = %call.method, %url, correlation_id, "Sending request");

        let mut request = self
            .http
            .request(call.method.clone(), &url)
            .header(CORRELATION_HEADER, correlation_id);
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        if call.timed {
            request = request.timeout(self.config.timeout());
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&call.target, self.config.timeout(), e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&call.target, self.config.timeout(), e))?;

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            debug!(%status, operation = call.target.operation, "Request failed");
            Err(status_error(
                &call.target,
                &self.config.service_name,
                status,
                retry_after,
                &body,
            ))
        }
    }

    fn decode<T: DeserializeOwned>(target: &Target, body: &[u8]) -> Result<T, PortError> {
        serde_json::from_slice(body).map_err(|e| decode_error(target, e))
    }
}

impl DomainPort for CrmApiClient {}

#[async_trait]
impl ClientPort for CrmApiClient {
    #[instrument(skip(self, metadata))]
    async fn list_clients(
        &self,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Client>, PortError> {
        let target = Target::new("list_clients", "Client");
        let body = self
            .execute(Call::new(Method::GET, "clients", target.clone()), metadata)
            .await?;

        let value: serde_json::Value =
            serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        if !value.is_array() {
            warn!("Client list response was not an array; showing no clients");
            return Ok(Vec::new());
        }

        serde_json::from_value(value).map_err(|e| decode_error(&target, e))
    }

    #[instrument(skip(self, metadata), fields(client_id = %id))]
    async fn get_client(
        &self,
        id: ClientId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Client, PortError> {
        let target = Target::new("get_client", "Client").with_id(id);
        let body = self
            .execute(
                Call::new(Method::GET, format!("clients/{id}"), target.clone()),
                metadata,
            )
            .await?;
        Self::decode(&target, &body)
    }

    #[instrument(skip(self, client, metadata))]
    async fn create_client(
        &self,
        client: &NewClient,
        metadata: Option<OperationMetadata>,
    ) -> Result<Client, PortError> {
        let target = Target::new("create_client", "Client");
        let call = Call::new(Method::POST, "clients", target.clone()).json(client)?;
        let body = self.execute(call, metadata).await?;
        Self::decode(&target, &body)
    }
}

#[async_trait]
impl PolicyPort for CrmApiClient {
    #[instrument(skip(self, request, metadata), fields(client_id = %client_id))]
    async fn estimate_premium(
        &self,
        client_id: ClientId,
        request: &PolicyRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Decimal, PortError> {
        let target = Target::new("estimate_premium", "Client").with_id(client_id);
        let call = Call::new(Method::POST, "calculate-premium", target.clone())
            .query("clientId", client_id)
            .json(request)?;
        let body = self.execute(call, metadata).await?;
        Self::decode(&target, &body)
    }

    #[instrument(skip(self, request, metadata), fields(client_id = %client_id))]
    async fn create_policy(
        &self,
        client_id: ClientId,
        request: &PolicyRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Policy, PortError> {
        let target = Target::new("create_policy", "Client").with_id(client_id);
        let call = Call::new(
            Method::POST,
            format!("clients/{client_id}/policies"),
            target.clone(),
        )
        .json(request)?
        .untimed();
        let body = self.execute(call, metadata).await?;
        Self::decode(&target, &body)
    }

    #[instrument(skip(self, policy, metadata), fields(policy_id = %id))]
    async fn update_policy(
        &self,
        id: PolicyId,
        policy: &Policy,
        metadata: Option<OperationMetadata>,
    ) -> Result<Policy, PortError> {
        let target = Target::new("update_policy", "Policy").with_id(id);
        let call = Call::new(Method::PUT, format!("policies/{id}"), target.clone()).json(policy)?;
        let body = self.execute(call, metadata).await?;
        Self::decode(&target, &body)
    }
}
