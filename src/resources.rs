// ABOUTME: Shared server resources bundle for dependency injection into routes
// ABOUTME: Owns the configuration, session manager, and chat state handed to handlers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Server resources
//!
//! One `Arc<ServerResources>` is constructed at startup and threaded
//! through every router. The session manager is the explicit owner of all
//! authentication state; nothing here is a process-wide global.

use std::sync::Arc;

use crate::chat::ChatState;
use crate::config::ServerConfig;
use crate::errors::AppResult;
use crate::oauth2_client::OAuth2Client;
use crate::session::SessionManager;
use crate::token_store::TokenStore;

/// Dependency bundle shared by all route handlers
pub struct ServerResources {
    /// Server configuration
    pub config: ServerConfig,
    /// The authentication session owner
    pub session: Arc<SessionManager>,
    /// Simulated conversation state
    pub chat: ChatState,
}

impl ServerResources {
    /// Build resources from configuration
    ///
    /// # Errors
    ///
    /// Returns an error when the token store location cannot be resolved.
    pub fn new(config: ServerConfig) -> AppResult<Self> {
        let store = TokenStore::from_config(&config)?;
        Ok(Self::with_store_and_chat(config, store, ChatState::new()))
    }

    /// Build resources with explicit store and chat state (tests use this
    /// to point storage at a temp directory and zero out the reply delay)
    #[must_use]
    pub fn with_store_and_chat(config: ServerConfig, store: TokenStore, chat: ChatState) -> Self {
        let client = OAuth2Client::new(config.oauth.clone());
        let session = Arc::new(SessionManager::new(client, store));

        Self {
            config,
            session,
            chat,
        }
    }
}
