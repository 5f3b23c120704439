// ABOUTME: Health check route for liveness probes
// ABOUTME: Reports service name and version with no authentication required
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::constants::service_names;
use crate::resources::ServerResources;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" when the server can respond
    pub status: String,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Deployment environment
    pub environment: String,
}

/// Health route handlers
pub struct HealthRoutes;

impl HealthRoutes {
    /// Build the health router
    #[must_use]
    pub fn router(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/health", get(health))
            .with_state(resources)
    }
}

/// `GET /api/health` - liveness probe
async fn health(State(resources): State<Arc<ServerResources>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        service: service_names::ANYCHAT_SERVER.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        environment: resources.config.environment.to_string(),
    })
}
