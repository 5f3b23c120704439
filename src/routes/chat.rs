// ABOUTME: Chat route handlers for the simulated conversation
// ABOUTME: Lists and appends messages, gated on an authenticated session
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Simulated chat routes
//!
//! Both endpoints are gated: anonymous sessions receive `401` with a
//! pointer to the login route. The chat itself is a demo fixture, see
//! [`crate::chat`].

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::constants::routes as route_paths;
use crate::errors::{AppError, AppResult};
use crate::models::ChatMessage;
use crate::resources::ServerResources;

/// Request to send a message
#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Message content
    pub content: String,
}

/// Response for the messages list
#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesListResponse {
    /// All messages, oldest first
    pub messages: Vec<ChatMessage>,
}

/// Response for a sent message and its simulated reply
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatExchangeResponse {
    /// The user's message as recorded
    pub user_message: ChatMessage,
    /// The canned assistant reply
    pub assistant_message: ChatMessage,
}

/// Chat route handlers
pub struct ChatRoutes;

impl ChatRoutes {
    /// Build the chat router
    #[must_use]
    pub fn router(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat/messages", get(list_messages).post(send_message))
            .with_state(resources)
    }
}

/// Reject anonymous sessions with a pointer to the login route
async fn require_session(resources: &ServerResources) -> AppResult<()> {
    if resources.session.is_authenticated().await {
        return Ok(());
    }
    Err(AppError::auth_required()
        .with_details(serde_json::json!({ "login_url": route_paths::LOGIN })))
}

/// `GET /api/chat/messages` - list the conversation
async fn list_messages(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Json<MessagesListResponse>> {
    require_session(&resources).await?;

    Ok(Json(MessagesListResponse {
        messages: resources.chat.list().await,
    }))
}

/// `POST /api/chat/messages` - send a message and receive the simulated reply
async fn send_message(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<SendMessageRequest>,
) -> AppResult<Json<ChatExchangeResponse>> {
    require_session(&resources).await?;

    if request.content.trim().is_empty() {
        return Err(AppError::missing_parameter("content"));
    }

    let (user_message, assistant_message) = resources.chat.send(request.content).await;

    Ok(Json(ChatExchangeResponse {
        user_message,
        assistant_message,
    }))
}
