// ABOUTME: Integration tests for the authentication route handlers
// ABOUTME: Covers login redirect, the callback receiver, logout, session info, and the pass-through
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use chrono::{Duration, Utc};
use common::{create_test_env, query_param, seed_snapshot};
use helpers::axum_test::AxumTestRequest;

use axum::http::StatusCode;
use serde_json::json;

use anychat::routes::{self, SessionInfoResponse, TokenExchangeResponse};

// ============================================================================
// Login initiation
// ============================================================================

#[tokio::test]
async fn test_login_redirects_to_authorization_endpoint() {
    let env = create_test_env().await;
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    let response = AxumTestRequest::get("/api/auth/login?return_to=/projects")
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);

    let location = response.header("location").unwrap();
    assert!(location.starts_with(&format!("{}/login", env.provider.base_url)));
    assert!(location.contains("response_type=code"));
    assert!(location.contains("client_id=test-client"));
    assert!(query_param(&location, "state").is_some());
}

// ============================================================================
// Callback receiver
// ============================================================================

#[tokio::test]
async fn test_callback_round_trip_redirects_to_saved_return_url() {
    let env = create_test_env().await;
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    let login = AxumTestRequest::get("/api/auth/login?return_to=/projects")
        .send(router.clone())
        .await;
    let state = query_param(&login.header("location").unwrap(), "state").unwrap();

    let callback = AxumTestRequest::get(&format!("/auth/callback?code=abc&state={state}"))
        .send(router)
        .await;

    assert_eq!(callback.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(callback.header("location").as_deref(), Some("/projects"));
    assert!(env.resources.session.is_authenticated().await);
}

#[tokio::test]
async fn test_callback_without_return_url_redirects_home() {
    let env = create_test_env().await;
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    let login = AxumTestRequest::get("/api/auth/login").send(router.clone()).await;
    let state = query_param(&login.header("location").unwrap(), "state").unwrap();

    let callback = AxumTestRequest::get(&format!("/auth/callback?code=abc&state={state}"))
        .send(router)
        .await;

    assert_eq!(callback.header("location").as_deref(), Some("/"));
}

#[tokio::test]
async fn test_callback_with_provider_error_renders_error_screen() {
    let env = create_test_env().await;
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    AxumTestRequest::get("/api/auth/login").send(router.clone()).await;

    let callback =
        AxumTestRequest::get("/auth/callback?error=access_denied&error_description=User+cancelled")
            .send(router)
            .await;

    assert_eq!(callback.status_code(), StatusCode::BAD_REQUEST);
    let body = callback.text();
    assert!(body.contains("Authentication Error"));
    assert!(body.contains("Return to Home"));
    assert_eq!(env.provider.exchange_calls(), 0);
}

#[tokio::test]
async fn test_callback_with_missing_code_renders_error_screen() {
    let env = create_test_env().await;
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    AxumTestRequest::get("/api/auth/login").send(router.clone()).await;

    let callback = AxumTestRequest::get("/auth/callback?state=whatever")
        .send(router)
        .await;

    assert_eq!(callback.status_code(), StatusCode::BAD_REQUEST);
    assert!(callback.text().contains("Return to Home"));
    assert_eq!(env.provider.exchange_calls(), 0);
}

// ============================================================================
// Token pass-through
// ============================================================================

#[tokio::test]
async fn test_token_passthrough_returns_camel_case_token_set() {
    let env = create_test_env().await;
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    let before_ms = Utc::now().timestamp_millis();
    let response = AxumTestRequest::post("/api/auth/token")
        .json(&json!({"code": "abc"}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    // The wire format uses camelCase keys
    let raw = response.text();
    assert!(raw.contains("accessToken"));
    assert!(raw.contains("expiresAt"));

    let tokens: TokenExchangeResponse = response.json();
    assert_eq!(tokens.access_token, "t1");
    assert_eq!(tokens.refresh_token.as_deref(), Some("r1"));
    assert!(tokens.expires_at >= before_ms + 3_500_000);
}

#[tokio::test]
async fn test_token_passthrough_missing_code_is_400() {
    let env = create_test_env().await;
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    let response = AxumTestRequest::post("/api/auth/token")
        .json(&json!({}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("MISSING_PARAMETER"));
    assert_eq!(env.provider.exchange_calls(), 0);
}

#[tokio::test]
async fn test_token_passthrough_exchange_failure_is_401() {
    let env = create_test_env().await;
    env.provider
        .state
        .fail_exchange
        .store(true, std::sync::atomic::Ordering::SeqCst);
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    let response = AxumTestRequest::post("/api/auth/token")
        .json(&json!({"code": "abc"}))
        .send(router)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(response.text().contains("EXCHANGE_FAILED"));
}

// ============================================================================
// Session info & logout
// ============================================================================

#[tokio::test]
async fn test_session_info_anonymous() {
    let env = create_test_env().await;
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    let response = AxumTestRequest::get("/api/auth/session").send(router).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let info: SessionInfoResponse = response.json();
    assert!(!info.authenticated);
    assert!(info.user.is_none());
}

#[tokio::test]
async fn test_session_info_never_leaks_tokens() {
    let env = create_test_env().await;
    seed_snapshot(&env.store, "secret-token", Some("secret-refresh"), Utc::now() + Duration::hours(1));
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    let response = AxumTestRequest::get("/api/auth/session").send(router).await;

    let raw = response.text();
    assert!(!raw.contains("secret-token"));
    assert!(!raw.contains("secret-refresh"));

    let info: SessionInfoResponse = response.json();
    assert!(info.authenticated);
    assert_eq!(info.user.unwrap().id, "u1");
    assert!(info.expires_at.is_some());
}

#[tokio::test]
async fn test_logout_route_clears_session_and_redirects_home() {
    let env = create_test_env().await;
    seed_snapshot(&env.store, "live", Some("r0"), Utc::now() + Duration::hours(1));
    env.resources.session.initialize().await;
    let router = routes::router(env.resources.clone());

    let response = AxumTestRequest::post("/api/auth/logout").send(router).await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location").as_deref(), Some("/"));
    assert!(!env.resources.session.is_authenticated().await);
    assert!(env.store.load().unwrap().is_none());
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_service_and_version() {
    let env = create_test_env().await;
    let router = routes::router(env.resources.clone());

    let response = AxumTestRequest::get("/api/health").send(router).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let health: routes::HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "anychat-server");
    assert!(!health.version.is_empty());
}
