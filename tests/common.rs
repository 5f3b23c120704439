// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides a mock identity provider, test resources, and snapshot seeding
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Shared test utilities for `anychat`
//!
//! Spins up a mock AnyAuth provider on an ephemeral port with atomic
//! request counters, so tests can assert exactly how many exchange,
//! refresh, and profile calls a flow performed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::json;

use anychat::chat::ChatState;
use anychat::config::oauth::AuthProviderSettings;
use anychat::config::{Environment, ServerConfig};
use anychat::models::{SessionSnapshot, UserProfile};
use anychat::resources::ServerResources;
use anychat::token_store::TokenStore;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Counters and switches controlling the mock provider
#[derive(Default)]
pub struct MockProviderState {
    /// Authorization-code grants received
    pub exchange_calls: AtomicUsize,
    /// Refresh-token grants received
    pub refresh_calls: AtomicUsize,
    /// Profile endpoint hits
    pub profile_calls: AtomicUsize,
    /// Protected endpoint hits
    pub protected_calls: AtomicUsize,
    /// Reject authorization-code grants with 401
    pub fail_exchange: AtomicBool,
    /// Reject refresh-token grants with 401
    pub fail_refresh: AtomicBool,
    /// Reject every bearer token, even freshly issued ones
    pub reject_bearer: AtomicBool,
    /// Reject requests to the protected endpoint only (token and profile
    /// endpoints keep working, so refreshes succeed)
    pub reject_protected: AtomicBool,
    /// Monotonic counter behind issued token names (t1, t2, ...)
    issued: AtomicUsize,
    /// The most recently issued (or manually seeded) access token
    latest_token: Mutex<String>,
}

impl MockProviderState {
    fn issue_tokens(&self) -> (String, String, u64) {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("t{n}");
        let refresh = format!("r{n}");
        *self.latest_token.lock().unwrap() = access.clone();
        (access, refresh, 3600)
    }

    /// Treat the given token as valid without issuing it through a grant
    pub fn set_latest_token(&self, token: &str) {
        *self.latest_token.lock().unwrap() = token.to_owned();
    }

    fn bearer_is_current(&self, headers: &HeaderMap) -> bool {
        if self.reject_bearer.load(Ordering::SeqCst) {
            return false;
        }
        let latest = self.latest_token.lock().unwrap().clone();
        if latest.is_empty() {
            return false;
        }
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {latest}"))
    }
}

/// A running mock identity provider
pub struct MockProvider {
    /// Base URL, e.g. `http://127.0.0.1:49152`
    pub base_url: String,
    /// Shared counters and switches
    pub state: Arc<MockProviderState>,
}

impl MockProvider {
    pub fn exchange_calls(&self) -> usize {
        self.state.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.state.profile_calls.load(Ordering::SeqCst)
    }

    pub fn protected_calls(&self) -> usize {
        self.state.protected_calls.load(Ordering::SeqCst)
    }
}

async fn token_endpoint(
    State(state): State<Arc<MockProviderState>>,
    Form(params): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    match params.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            state.exchange_calls.fetch_add(1, Ordering::SeqCst);
            if state.fail_exchange.load(Ordering::SeqCst) || !params.contains_key("code") {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "invalid_grant"})),
                );
            }
            let (access, refresh, expires_in) = state.issue_tokens();
            (
                StatusCode::OK,
                Json(json!({
                    "access_token": access,
                    "refresh_token": refresh,
                    "expires_in": expires_in,
                    "token_type": "Bearer",
                })),
            )
        }
        Some("refresh_token") => {
            state.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if state.fail_refresh.load(Ordering::SeqCst) || !params.contains_key("refresh_token") {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "invalid_grant"})),
                );
            }
            let (access, refresh, expires_in) = state.issue_tokens();
            (
                StatusCode::OK,
                Json(json!({
                    "access_token": access,
                    "refresh_token": refresh,
                    "expires_in": expires_in,
                    "token_type": "Bearer",
                })),
            )
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        ),
    }
}

async fn me_endpoint(
    State(state): State<Arc<MockProviderState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.profile_calls.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_is_current(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_token"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "u1",
            "username": "alice",
            "full_name": "Alice Anderson",
            "email": "alice@example.com",
            "email_verified": true,
            "picture": "https://example.com/alice.png",
            "disabled": false,
            "metadata": {},
        })),
    )
}

async fn protected_endpoint(
    State(state): State<Arc<MockProviderState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.protected_calls.fetch_add(1, Ordering::SeqCst);
    if state.reject_protected.load(Ordering::SeqCst) || !state.bearer_is_current(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_token"})),
        );
    }
    (StatusCode::OK, Json(json!({"ok": true})))
}

/// Start a mock AnyAuth provider on an ephemeral port
pub async fn spawn_mock_provider() -> MockProvider {
    init_test_logging();

    let state = Arc::new(MockProviderState::default());
    let app = Router::new()
        .route("/api/auth/token", post(token_endpoint))
        .route("/api/me", get(me_endpoint))
        .route("/api/protected", get(protected_endpoint))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock provider");
    let addr = listener.local_addr().expect("mock provider address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock provider");
    });

    MockProvider {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// Server configuration pointing at the mock provider and a temp store
pub fn test_config(provider_base_url: &str, storage_path: PathBuf) -> ServerConfig {
    ServerConfig {
        http_port: 0,
        base_url: "http://localhost:3010".to_owned(),
        environment: Environment::Testing,
        storage_path: Some(storage_path),
        oauth: AuthProviderSettings {
            client_id: "test-client".to_owned(),
            client_secret: Some("test-secret".to_owned()),
            auth_url: format!("{provider_base_url}/login"),
            token_url: format!("{provider_base_url}/api/auth/token"),
            userinfo_url: format!("{provider_base_url}/api/me"),
            redirect_uri: "http://localhost:3010/auth/callback".to_owned(),
            scopes: vec!["openid".to_owned(), "profile".to_owned()],
        },
    }
}

/// A test environment: mock provider, temp storage, server resources
pub struct TestEnv {
    pub provider: MockProvider,
    pub resources: Arc<ServerResources>,
    pub store: TokenStore,
    // Keeps the storage directory alive for the duration of the test
    pub storage_dir: tempfile::TempDir,
}

/// Build a full test environment with zero chat reply delay
pub async fn create_test_env() -> TestEnv {
    let provider = spawn_mock_provider().await;
    let storage_dir = tempfile::tempdir().expect("temp storage dir");
    let storage_path = storage_dir.path().join("session.json");

    let config = test_config(&provider.base_url, storage_path.clone());
    let store = TokenStore::new(storage_path);
    let chat = ChatState::with_reply_delay(Duration::ZERO);
    let resources = Arc::new(ServerResources::with_store_and_chat(config, store.clone(), chat));

    TestEnv {
        provider,
        resources,
        store,
        storage_dir,
    }
}

/// The profile the mock provider reports
pub fn test_profile() -> UserProfile {
    UserProfile {
        id: "u1".to_owned(),
        username: Some("alice".to_owned()),
        full_name: Some("Alice Anderson".to_owned()),
        email: Some("alice@example.com".to_owned()),
        email_verified: Some(true),
        picture: Some("https://example.com/alice.png".to_owned()),
        disabled: Some(false),
        metadata: HashMap::new(),
    }
}

/// Seed the store with a snapshot expiring at the given instant
pub fn seed_snapshot(
    store: &TokenStore,
    access_token: &str,
    refresh_token: Option<&str>,
    expires_at: DateTime<Utc>,
) {
    store
        .save(&SessionSnapshot {
            access_token: access_token.to_owned(),
            refresh_token: refresh_token.map(str::to_owned),
            expires_at,
            user: test_profile(),
        })
        .expect("failed to seed snapshot");
}

/// Extract a query parameter from a URL string
pub fn query_param(url: &str, name: &str) -> Option<String> {
    url::Url::parse(url).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    })
}
