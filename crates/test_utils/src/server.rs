//! In-process stub of the CRM REST service
//!
//! Serves the same routes as the real service on an ephemeral local port,
//! keeps clients and their policies in memory, and records every request so
//! tests can inspect what an adapter actually sent.
//!
//! ```rust,ignore
//! let server = StubCrmServer::with_clients(vec![ClientFixtures::ada(7)]).await;
//! let api = CrmApiClient::new(ApiClientConfig::with_base_url(server.base_url()))?;
//! ```

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use domain_client::Client;
use domain_policy::Policy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::fixtures::IdFixtures;

/// Premium per unit of coverage the stub quotes by default
pub const STUB_PREMIUM_RATE: Decimal = dec!(0.0005);

/// A request as the stub received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub correlation_id: Option<String>,
    pub body: Option<Value>,
}

struct StubState {
    clients: Mutex<BTreeMap<i64, Client>>,
    list_body: Mutex<Option<String>>,
    forced: Mutex<VecDeque<(StatusCode, Option<String>)>>,
    requests: Mutex<Vec<RecordedRequest>>,
    premium_rate: Mutex<Decimal>,
    next_id: Mutex<i64>,
}

impl StubState {
    /// Records the request and returns a forced response, if one is queued
    async fn intercept(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: Option<&Value>,
    ) -> Option<Response> {
        self.requests.lock().await.push(RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            correlation_id: headers
                .get("x-correlation-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: body.cloned(),
        });

        let (status, message) = self.forced.lock().await.pop_front()?;
        Some(match message {
            Some(message) => (status, Json(json!({ "message": message }))).into_response(),
            None => status.into_response(),
        })
    }

    async fn allocate_id(&self) -> i64 {
        let mut next = self.next_id.lock().await;
        *next += 1;
        *next
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
}

/// Handle to a running stub server; the server stops when this is dropped
pub struct StubCrmServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubCrmServer {
    /// Starts an empty stub on an ephemeral port
    pub async fn start() -> Self {
        Self::with_clients(Vec::new()).await
    }

    /// Starts a stub holding the given clients
    pub async fn with_clients(clients: Vec<Client>) -> Self {
        let mut stored = BTreeMap::new();
        let mut max_id = 0;
        for client in clients {
            let id = client.id.map(|id| id.get()).unwrap_or(max_id + 1);
            max_id = max_id.max(id);
            stored.insert(id, Client { id: Some(IdFixtures::client_id(id)), ..client });
        }

        let state = Arc::new(StubState {
            clients: Mutex::new(stored),
            list_body: Mutex::new(None),
            forced: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            premium_rate: Mutex::new(STUB_PREMIUM_RATE),
            next_id: Mutex::new(max_id.max(100)),
        });

        let app = Router::new()
            .route("/api/clients", get(list_clients).post(create_client))
            .route("/api/clients/:id", get(get_client))
            .route("/api/clients/:id/policies", post(create_policy))
            .route("/api/policies/:id", put(update_policy))
            .route("/api/calculate-premium", post(calculate_premium))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL including the `/api` prefix
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Replaces the raw body `GET /api/clients` answers with
    pub async fn set_list_body(&self, raw: &str) {
        *self.state.list_body.lock().await = Some(raw.to_string());
    }

    pub async fn set_premium_rate(&self, rate: Decimal) {
        *self.state.premium_rate.lock().await = rate;
    }

    /// Makes the next request, whatever its route, fail with `status`
    pub async fn fail_next(&self, status: u16, message: Option<&str>) {
        let status = StatusCode::from_u16(status).unwrap();
        self.state
            .forced
            .lock()
            .await
            .push_back((status, message.map(str::to_string)));
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }

    pub async fn client(&self, id: i64) -> Option<Client> {
        self.state.clients.lock().await.get(&id).cloned()
    }
}

impl Drop for StubCrmServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

type Shared = State<Arc<StubState>>;

async fn list_clients(State(state): Shared, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    if let Some(forced) = state.intercept(&method, &uri, &headers, None).await {
        return forced;
    }
    if let Some(raw) = state.list_body.lock().await.clone() {
        return ([("content-type", "application/json")], raw).into_response();
    }
    let clients: Vec<Client> = state.clients.lock().await.values().cloned().collect();
    Json(clients).into_response()
}

async fn get_client(
    State(state): Shared,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(forced) = state.intercept(&method, &uri, &headers, None).await {
        return forced;
    }
    match state.clients.lock().await.get(&id) {
        Some(client) => Json(client.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("Client not found with ID: {id}") })),
        )
            .into_response(),
    }
}

async fn create_client(
    State(state): Shared,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(forced) = state.intercept(&method, &uri, &headers, Some(&body)).await {
        return forced;
    }
    let mut client: Client = match serde_json::from_value(body) {
        Ok(client) => client,
        Err(e) => return bad_request(e.to_string()),
    };
    let id = state.allocate_id().await;
    client.id = Some(IdFixtures::client_id(id));
    client.policies = Some(Vec::new());
    state.clients.lock().await.insert(id, client.clone());
    Json(client).into_response()
}

async fn calculate_premium(
    State(state): Shared,
    Query(params): Query<HashMap<String, String>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(forced) = state.intercept(&method, &uri, &headers, Some(&body)).await {
        return forced;
    }
    let client_id = params.get("clientId").cloned().unwrap_or_default();
    let known = match client_id.parse::<i64>() {
        Ok(id) => state.clients.lock().await.contains_key(&id),
        Err(_) => false,
    };
    if !known {
        return bad_request(format!("Client not found with ID: {client_id}"));
    }

    let policy: Policy = match serde_json::from_value(body) {
        Ok(policy) => policy,
        Err(e) => return bad_request(e.to_string()),
    };
    let rate = *state.premium_rate.lock().await;
    let premium = (policy.coverage_amount.unwrap_or_default() * rate).round_dp(2);
    Json(premium).into_response()
}

async fn create_policy(
    State(state): Shared,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(forced) = state.intercept(&method, &uri, &headers, Some(&body)).await {
        return forced;
    }
    if !state.clients.lock().await.contains_key(&id) {
        return bad_request(format!(
            "Failed to create policy: Client not found with ID: {id}"
        ));
    }

    let mut policy: Policy = match serde_json::from_value(body) {
        Ok(policy) => policy,
        Err(e) => return bad_request(format!("Failed to create policy: {e}")),
    };
    let rate = *state.premium_rate.lock().await;
    policy.premium_amount = policy.coverage_amount.map(|c| (c * rate).round_dp(2));
    policy.end_date = policy.expected_end_date();
    policy.id = Some(IdFixtures::policy_id(state.allocate_id().await));

    if let Some(client) = state.clients.lock().await.get_mut(&id) {
        client.policies.get_or_insert_with(Vec::new).push(policy.clone());
    }
    Json(policy).into_response()
}

async fn update_policy(
    State(state): Shared,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(forced) = state.intercept(&method, &uri, &headers, Some(&body)).await {
        return forced;
    }
    let mut policy: Policy = match serde_json::from_value(body) {
        Ok(policy) => policy,
        Err(e) => return bad_request(e.to_string()),
    };
    policy.id = Some(IdFixtures::policy_id(id));
    Json(policy).into_response()
}
