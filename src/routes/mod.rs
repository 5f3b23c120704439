// ABOUTME: Route module organization for AnyChat HTTP endpoints
// ABOUTME: Provides route definitions organized by domain and the merged application router
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Route modules
//!
//! Each domain module contains route definitions and thin handler functions
//! that delegate to the session manager and chat state.

/// Authentication routes: login, callback, logout, session, pass-through
pub mod auth;
/// Simulated chat routes
pub mod chat;
/// Health check routes
pub mod health;

use std::sync::Arc;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::resources::ServerResources;

pub use auth::{AuthRoutes, SessionInfoResponse, TokenExchangeRequest, TokenExchangeResponse};
pub use chat::{ChatExchangeResponse, ChatRoutes, MessagesListResponse, SendMessageRequest};
pub use health::{HealthResponse, HealthRoutes};

/// Minimal home page; the real UI is not part of this demo's core
async fn home() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}

/// Build the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    let cors = if resources.config.environment.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::permissive()
    };

    Router::new()
        .route("/", get(home))
        .merge(AuthRoutes::router(resources.clone()))
        .merge(ChatRoutes::router(resources.clone()))
        .merge(HealthRoutes::router(resources))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
