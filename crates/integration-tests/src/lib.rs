//! Integration test harness for Terra Admin.
//!
//! [`TestContext`] boots an in-process stub of the Terra backend (axum) on
//! an ephemeral port and wires a [`SessionManager`]/[`OrderWorkflow`] pair
//! at it through a temporary state directory. The stub records every request
//! it serves - method, path, `Authorization` header, JSON body - so tests
//! can assert exactly what went over the wire.
//!
//! # Test Categories
//!
//! - `session_lifecycle` - Login/logout/persistence/forced sign-out
//! - `order_workflow` - Status transitions, side-effect payloads,
//!   payment-link dispatch

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;

use terra_console::{ConsoleConfig, OrderWorkflow, SessionManager};

/// Username the stub backend accepts by default.
pub const ADMIN_USERNAME: &str = "admin";
/// Password the stub backend accepts by default.
pub const ADMIN_PASSWORD: &str = "terra-secret";

/// Fixture order: new, unpaid, no payment link yet.
pub const ORDER_NEW: &str = "64f0aa10c2b7e93d5a000001";
/// Fixture order: processing, paid, payment link already sent.
pub const ORDER_PROCESSING: &str = "64f0aa10c2b7e93d5a000002";

/// A request the stub backend served.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Raw `Authorization` header value, if the request carried one.
    pub authorization: Option<String>,
    /// JSON body, or `null` for bodyless requests.
    pub body: Value,
}

/// Mutable stub state shared with the handlers.
#[derive(Debug)]
struct BackendState {
    requests: Vec<RecordedRequest>,
    /// Tokens the stub currently accepts on privileged routes.
    valid_tokens: Vec<String>,
    /// Accounts the auth endpoints accept: (username, password).
    accounts: Vec<(String, String)>,
    orders: Vec<Value>,
    /// When set, payment-status mutations answer with this value instead of
    /// the requested one (exercises backend-is-authoritative reconciliation).
    payment_status_override: Option<String>,
    /// When set, the next mutation is refused with this message.
    reject_next: Option<String>,
    issued: u32,
}

impl BackendState {
    fn fixture() -> Self {
        Self {
            requests: Vec::new(),
            valid_tokens: Vec::new(),
            accounts: vec![(ADMIN_USERNAME.to_owned(), ADMIN_PASSWORD.to_owned())],
            orders: vec![
                json!({
                    "_id": ORDER_NEW,
                    "orderNumber": "TRA-1001",
                    "orderStatus": "new",
                    "paymentStatus": "pending",
                    "totalAmount": 4890,
                    "items": [
                        {"name": "Ceramic mug", "price": 1630, "quantity": 3}
                    ],
                    "customer": {
                        "firstName": "Anna",
                        "lastName": "Petrova",
                        "email": "anna@example.com",
                        "phone": "+7 900 000-00-00"
                    },
                    "shipping": {
                        "method": "cdek_pvz",
                        "address": "Lenina 5",
                        "city": "Moscow",
                        "postalCode": "101000",
                        "country": "RU"
                    },
                    "paymentMethod": "sbp",
                    "createdAt": "2026-07-14T10:30:00Z"
                }),
                json!({
                    "_id": ORDER_PROCESSING,
                    "orderNumber": "TRA-1002",
                    "orderStatus": "processing",
                    "paymentStatus": "paid",
                    "paymentLink": "https://pay.example/old",
                    "totalAmount": 12500,
                    "items": [
                        {"name": "Linen tablecloth", "price": 12500, "quantity": 1}
                    ],
                    "customer": {
                        "firstName": "Ivan",
                        "lastName": "Orlov",
                        "email": "ivan@example.com"
                    },
                    "shipping": {
                        "method": "own_courier",
                        "address": "Arbat 12",
                        "city": "Moscow",
                        "postalCode": "119002",
                        "country": "RU"
                    },
                    "paymentMethod": "cash_courier",
                    "createdAt": "2026-07-15T08:00:00Z"
                }),
            ],
            payment_status_override: None,
            reject_next: None,
            issued: 0,
        }
    }

    fn record(&mut self, method: &str, path: String, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        self.requests.push(RecordedRequest {
            method: method.to_owned(),
            path,
            authorization,
            body,
        });
    }

    fn issue_token(&mut self) -> String {
        self.issued += 1;
        let token = format!("tok_{}", self.issued);
        self.valid_tokens.push(token.clone());
        token
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| self.valid_tokens.iter().any(|valid| valid == token))
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// In-process stub of the Terra backend.
pub struct TestBackend {
    addr: SocketAddr,
    state: Shared,
}

impl TestBackend {
    /// Bind an ephemeral port and start serving the stub.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState::fixture()));
        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/orders", get(list_orders))
            .route("/orders/{id}/status", put(update_status))
            .route("/orders/{id}/send-payment-link", post(send_payment_link))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub backend");
        });

        Self { addr, state }
    }

    /// Base URL the console should be pointed at.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("stub backend state")
    }

    /// Everything the stub has served so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests matching a method and path substring.
    #[must_use]
    pub fn requests_matching(&self, method: &str, path_part: &str) -> Vec<RecordedRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|req| req.method == method && req.path.contains(path_part))
            .cloned()
            .collect()
    }

    /// Total number of requests served.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Tokens the stub currently accepts.
    #[must_use]
    pub fn valid_tokens(&self) -> Vec<String> {
        self.lock().valid_tokens.clone()
    }

    /// Invalidate every issued token; the next privileged call answers 401.
    pub fn revoke_tokens(&self) {
        self.lock().valid_tokens.clear();
    }

    /// Drop all accounts so `register` can bootstrap the first one.
    pub fn clear_accounts(&self) {
        self.lock().accounts.clear();
    }

    /// Make payment-status mutations answer with this value instead of the
    /// requested one.
    pub fn set_payment_status_override(&self, status: &str) {
        self.lock().payment_status_override = Some(status.to_owned());
    }

    /// Refuse the next mutation with the given message.
    pub fn reject_next_mutation(&self, message: &str) {
        self.lock().reject_next = Some(message.to_owned());
    }
}

// =============================================================================
// Stub handlers
// =============================================================================

async fn login(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("stub backend state");
    state.record("POST", "/auth/login".to_owned(), &headers, body.clone());

    let username = body["username"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default().to_owned();

    let credentials_ok = state
        .accounts
        .iter()
        .any(|(user, pass)| user == &username && pass == &password);
    let account_exists = state.accounts.iter().any(|(user, _)| user == &username);

    if credentials_ok {
        let token = state.issue_token();
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "token": token,
                "admin": {"username": username, "role": "admin"}
            })),
        )
    } else if account_exists {
        // Known account, wrong password: rejection inside a 200 envelope.
        (
            StatusCode::OK,
            Json(json!({"success": false, "message": "Invalid username or password"})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Unknown administrator"})),
        )
    }
}

async fn register(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("stub backend state");
    state.record("POST", "/auth/register".to_owned(), &headers, body.clone());

    if !state.accounts.is_empty() {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "message": "Administrator already exists"})),
        );
    }

    let username = body["username"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default().to_owned();
    state.accounts.push((username.clone(), password));
    let token = state.issue_token();

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "token": token,
            "admin": {"username": username, "role": "admin"}
        })),
    )
}

async fn list_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("stub backend state");
    state.record("GET", "/orders".to_owned(), &headers, Value::Null);

    if !state.authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Unauthorized"})),
        );
    }

    let orders = state.orders.clone();
    (StatusCode::OK, Json(json!({"data": orders})))
}

async fn update_status(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("stub backend state");
    state.record("PUT", format!("/orders/{id}/status"), &headers, body.clone());

    if !state.authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Unauthorized"})),
        );
    }

    if let Some(message) = state.reject_next.take() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"success": false, "message": message})),
        );
    }

    let payment_override = state.payment_status_override.clone();
    let Some(order) = state
        .orders
        .iter_mut()
        .find(|order| order["_id"] == id.as_str())
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Order not found"})),
        );
    };

    if let Some(status) = body.get("orderStatus").and_then(Value::as_str) {
        order["orderStatus"] = json!(status);
    }
    if let Some(tracking) = body.get("trackingNumber").and_then(Value::as_str) {
        order["trackingNumber"] = json!(tracking);
    }
    if let Some(status) = body.get("paymentStatus").and_then(Value::as_str) {
        let value = payment_override.unwrap_or_else(|| status.to_owned());
        order["paymentStatus"] = json!(value);
    }

    let data = order.clone();
    (StatusCode::OK, Json(json!({"success": true, "data": data})))
}

async fn send_payment_link(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("stub backend state");
    state.record(
        "POST",
        format!("/orders/{id}/send-payment-link"),
        &headers,
        body.clone(),
    );

    if !state.authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Unauthorized"})),
        );
    }

    let link = body["paymentLink"].as_str().unwrap_or_default().to_owned();
    if link.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "paymentLink is required"})),
        );
    }

    let Some(order) = state
        .orders
        .iter_mut()
        .find(|order| order["_id"] == id.as_str())
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Order not found"})),
        );
    };

    order["paymentLink"] = json!(link);
    let data = order.clone();
    (StatusCode::OK, Json(json!({"success": true, "data": data})))
}

// =============================================================================
// Test context
// =============================================================================

/// A stub backend plus a console wired at it through a temp state directory.
pub struct TestContext {
    pub backend: TestBackend,
    pub session: SessionManager,
    pub workflow: OrderWorkflow,
    state_dir: TempDir,
}

impl TestContext {
    /// Boot the stub backend and open an anonymous console against it.
    pub async fn new() -> Self {
        let backend = TestBackend::spawn().await;
        let state_dir = tempfile::tempdir().expect("temp state dir");

        let config = ConsoleConfig::new(
            Url::parse(&backend.url()).expect("stub backend url"),
            state_dir.path(),
        );
        let session = SessionManager::open(&config).await;
        let workflow = OrderWorkflow::new(session.clone());

        Self {
            backend,
            session,
            workflow,
            state_dir,
        }
    }

    /// Configuration pointing at this context's backend and state directory.
    ///
    /// Opening a second `SessionManager` from it simulates a process restart
    /// over the same durable store.
    #[must_use]
    pub fn config(&self) -> ConsoleConfig {
        ConsoleConfig::new(
            Url::parse(&self.backend.url()).expect("stub backend url"),
            self.state_dir.path(),
        )
    }

    /// Sign in with the default fixture account.
    pub async fn login(&self) {
        let outcome = self
            .session
            .login(ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .expect("login exchange");
        assert!(outcome.is_granted(), "fixture login must be accepted");
    }
}
