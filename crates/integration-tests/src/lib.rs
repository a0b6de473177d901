//! Integration tests for the Prestamos session stack.
//!
//! Tests run the real [`HttpAuthClient`] against [`MockBackend`], an
//! in-process `axum` server that mimics the backend's auth endpoints. No
//! external services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p prestamos-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_scenarios` - Login, logout and restore end to end
//! - `http_client` - Request and error mapping of the HTTP client
//! - `file_store` - Sessions persisted to disk across restarts
//! - `biometric_replay` - Biometric unlock feeding the ordinary login

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

use prestamos_session::{CredentialStore, HttpAuthClient, SessionManager};

/// Account the mock backend accepts.
pub const TEST_EMAIL: &str = "test@example.com";
pub const TEST_PASSWORD: &str = "password123";
/// Token issued on successful login.
pub const TEST_TOKEN: &str = "mock-token-123";

/// Reply sent for a successful login unless overridden.
#[must_use]
pub fn default_login_reply() -> Value {
    json!({
        "user": {
            "id": 1,
            "name": "Test User",
            "email": TEST_EMAIL,
            "roles": ["cliente"]
        },
        "token": TEST_TOKEN
    })
}

#[derive(Default)]
struct MockState {
    reply: Mutex<Value>,
    forced: Mutex<Option<(StatusCode, String)>>,
    delay: Mutex<Duration>,
    fail_logout: AtomicBool,
    logins: Mutex<Vec<Value>>,
    logout_tokens: Mutex<Vec<String>>,
}

/// In-process stand-in for the backend auth API, served under `/api`.
///
/// The server stops when the value is dropped.
pub struct MockBackend {
    base_url: Url,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend that answers with [`default_login_reply`].
    pub async fn start() -> Self {
        Self::start_with(default_login_reply()).await
    }

    /// Start a backend that answers valid logins with `reply`.
    pub async fn start_with(reply: Value) -> Self {
        let state = Arc::new(MockState {
            reply: Mutex::new(reply),
            ..MockState::default()
        });

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/logout", post(logout))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr: SocketAddr = listener.local_addr().expect("Failed to read mock address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock backend failed");
        });

        let base_url = Url::parse(&format!("http://{addr}/api")).expect("Invalid mock URL");
        Self {
            base_url,
            state,
            server,
        }
    }

    /// API base URL, without a trailing slash.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// HTTP client pointed at this backend.
    #[must_use]
    pub fn client(&self, timeout: Duration) -> HttpAuthClient {
        HttpAuthClient::new(&self.base_url, timeout).expect("Failed to build client")
    }

    /// Session manager over this backend and `store`, with no restore delay.
    #[must_use]
    pub fn session(&self, store: Arc<dyn CredentialStore>) -> SessionManager {
        SessionManager::new(store, Arc::new(self.client(Duration::from_secs(5))))
            .with_restore_delay(Duration::ZERO)
    }

    /// Answer every login with `status` and a raw JSON-typed `body`.
    pub async fn force_login_response(&self, status: StatusCode, body: impl Into<String>) {
        *self.state.forced.lock().await = Some((status, body.into()));
    }

    /// Sleep before answering logins and logouts.
    pub async fn set_response_delay(&self, delay: Duration) {
        *self.state.delay.lock().await = delay;
    }

    /// Answer logouts with 500.
    pub fn fail_logouts(&self) {
        self.state.fail_logout.store(true, Ordering::SeqCst);
    }

    /// Bodies of every login request received.
    pub async fn login_requests(&self) -> Vec<Value> {
        self.state.logins.lock().await.clone()
    }

    /// Bearer tokens of every logout request received.
    pub async fn logout_tokens(&self) -> Vec<String> {
        self.state.logout_tokens.lock().await.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.logins.lock().await.push(body.clone());

    wait_configured_delay(&state).await;

    if let Some((status, raw)) = state.forced.lock().await.clone() {
        return (status, [(header::CONTENT_TYPE, "application/json")], raw).into_response();
    }

    if body["username"] == TEST_EMAIL && body["password"] == TEST_PASSWORD {
        (StatusCode::OK, Json(state.reply.lock().await.clone())).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn logout(State(state): State<Arc<MockState>>, headers: HeaderMap) -> StatusCode {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned);

    let Some(token) = token else {
        return StatusCode::UNAUTHORIZED;
    };
    state.logout_tokens.lock().await.push(token);
    wait_configured_delay(&state).await;

    if state.fail_logout.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn wait_configured_delay(state: &MockState) {
    let delay = *state.delay.lock().await;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// A URL nothing is listening on.
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind closed listener");
    let addr = listener.local_addr().expect("Failed to read closed listener address");
    drop(listener);
    Url::parse(&format!("http://{addr}/api")).expect("Invalid unreachable URL")
}
