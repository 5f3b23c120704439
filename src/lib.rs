// ABOUTME: Main library entry point for the AnyChat demo application
// ABOUTME: Provides the OAuth2 session lifecycle and the simulated chat HTTP surface
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

#![deny(unsafe_code)]

//! # AnyChat
//!
//! A demo chat application whose core is the client-side OAuth2
//! authorization-code session lifecycle against the AnyAuth identity
//! provider: initiating login, receiving the redirect callback, exchanging
//! the code for tokens, persisting and restoring session state, and
//! silently refreshing tokens before expiry while gating the (fully
//! simulated) chat endpoints.
//!
//! ## Architecture
//!
//! - **Token Store**: atomic file-backed persistence for the session
//!   snapshot, the local-storage analog
//! - **`OAuth2` Client**: code exchange, token refresh, and profile fetch
//!   against the provider's fixed wire contract
//! - **Session Manager**: the state machine
//!   (`Loading -> {Anonymous, Authenticated, Error}`) and single owner of
//!   all authentication state
//! - **Routes**: login initiation, callback receiver, logout, session
//!   info, the token pass-through, and the gated chat endpoints
//!
//! ## Example
//!
//! ```rust,no_run
//! use anychat::config::ServerConfig;
//! use anychat::resources::ServerResources;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::new(config)?);
//!     resources.session.initialize().await;
//!
//!     let app = anychat::routes::router(resources);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3010").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

/// Authenticated request helper with one-shot refresh-and-retry
pub mod auth_fetch;

/// Simulated chat conversation state
pub mod chat;

/// Configuration management
pub mod config;

/// Application constants
pub mod constants;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Structured logging configuration
pub mod logging;

/// Core data models for the session and chat
pub mod models;

/// `OAuth2` authorization-code client
pub mod oauth2_client;

/// Shared server resources for dependency injection
pub mod resources;

/// HTTP routes
pub mod routes;

/// Session state machine
pub mod session;

/// Persistent token storage
pub mod token_store;

/// Shared utilities
pub mod utils;
