// ABOUTME: Authentication route handlers for the OAuth2 session lifecycle
// ABOUTME: Login initiation, redirect callback, logout, session info, and the token pass-through
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Authentication routes
//!
//! The callback receiver accepts exactly one redirect shape: an opaque
//! `code` plus the echoed CSRF `state`. On failure it renders a terminal
//! error screen with a return-home action; on success it performs the
//! saved post-login redirect at most once.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::constants::routes as route_paths;
use crate::errors::{AppError, AppResult};
use crate::models::{AuthStatus, UserProfile};
use crate::resources::ServerResources;
use crate::session::CallbackParams;

/// Query parameters accepted by the login initiation route
#[derive(Debug, Deserialize, Default)]
pub struct LoginQuery {
    /// Where to send the user after a successful login
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Query parameters delivered by the provider redirect
#[derive(Debug, Deserialize, Default)]
pub struct CallbackQuery {
    /// Authorization code
    #[serde(default)]
    pub code: Option<String>,
    /// Echoed CSRF state
    #[serde(default)]
    pub state: Option<String>,
    /// Provider-reported error identifier
    #[serde(default)]
    pub error: Option<String>,
    /// Provider-reported error description
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Request body for the token pass-through route
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenExchangeRequest {
    /// Authorization code to exchange
    #[serde(default)]
    pub code: Option<String>,
}

/// Response body of the token pass-through route
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeResponse {
    /// Access token issued by the provider
    pub access_token: String,
    /// Refresh token, when the provider issued one
    pub refresh_token: Option<String>,
    /// Expiry as epoch milliseconds
    pub expires_at: i64,
}

/// Session info exposed to the UI; never includes tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfoResponse {
    /// Lifecycle status
    pub status: AuthStatus,
    /// Whether the session satisfies the authenticated invariant
    pub authenticated: bool,
    /// Cached user profile
    pub user: Option<UserProfile>,
    /// Access token expiry
    pub expires_at: Option<DateTime<Utc>>,
    /// Last user-visible error message
    pub error: Option<String>,
}

/// Authentication route handlers
pub struct AuthRoutes;

impl AuthRoutes {
    /// Build the authentication router
    #[must_use]
    pub fn router(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(route_paths::LOGIN, get(login))
            .route(route_paths::AUTH_CALLBACK, get(callback))
            .route("/api/auth/token", post(exchange_token))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/session", get(session_info))
            .with_state(resources)
    }
}

/// `GET /api/auth/login` - record the pending context and redirect to the
/// provider's authorization endpoint
async fn login(
    State(resources): State<Arc<ServerResources>>,
    Query(query): Query<LoginQuery>,
) -> AppResult<Redirect> {
    let url = resources.session.login(query.return_to).await?;
    Ok(Redirect::temporary(url.as_str()))
}

/// `GET /auth/callback` - the callback receiver
async fn callback(
    State(resources): State<Arc<ServerResources>>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let params = CallbackParams {
        code: query.code,
        state: query.state,
        error: query.error,
        error_description: query.error_description,
    };

    match resources.session.handle_callback(params).await {
        Ok(return_url) => {
            let target = return_url.unwrap_or_else(|| route_paths::HOME.to_owned());
            info!(target = %target, "Login complete, redirecting");
            Redirect::to(&target).into_response()
        }
        Err(e) => render_error_screen(&e),
    }
}

/// `POST /api/auth/token` - pass-through code exchange with injected
/// client credentials
///
/// Returns `400` when the code is missing, `401` when the provider rejects
/// the exchange, `500` on unexpected errors.
async fn exchange_token(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<TokenExchangeRequest>,
) -> AppResult<Json<TokenExchangeResponse>> {
    let Some(code) = request.code else {
        return Err(AppError::missing_parameter("code"));
    };

    let tokens = resources
        .session
        .client()
        .exchange_code(&code)
        .await
        .inspect_err(|e| error!(error = %e, "Token exchange failed"))?;

    Ok(Json(TokenExchangeResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_at: tokens.expires_at.timestamp_millis(),
    }))
}

/// `POST /api/auth/logout` - clear the session and return home
async fn logout(State(resources): State<Arc<ServerResources>>) -> Redirect {
    resources.session.logout().await;
    Redirect::to(route_paths::HOME)
}

/// `GET /api/auth/session` - session snapshot for the UI
async fn session_info(State(resources): State<Arc<ServerResources>>) -> Json<SessionInfoResponse> {
    let session = resources.session.snapshot().await;
    Json(SessionInfoResponse {
        authenticated: session.is_authenticated(),
        status: session.status,
        user: session.user,
        expires_at: session.expires_at,
        error: session.error,
    })
}

/// Render the terminal callback error screen
fn render_error_screen(error: &AppError) -> Response {
    const TEMPLATE: &str = include_str!("../../templates/auth_error.html");

    let html = TEMPLATE
        .replace("{{ERROR}}", error.code.description())
        .replace("{{DESCRIPTION}}", &error.message);

    (StatusCode::BAD_REQUEST, Html(html)).into_response()
}
