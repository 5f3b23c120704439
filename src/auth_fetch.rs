// ABOUTME: Authenticated request helper wrapping outbound calls with bearer tokens
// ABOUTME: Refreshes before sending and retries exactly once after an authorization failure
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Authenticated outbound requests
//!
//! Wraps a reqwest call with the session's bearer token: the token is
//! refreshed advisorily before sending, and a 401 from the remote endpoint
//! triggers exactly one forced refresh and retry. A second 401 resolves to
//! `SessionExpired`; there is no retry loop.

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};
use crate::session::SessionManager;
use crate::utils::http_client::shared_client;

/// Behavior when a protected call is attempted without a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnUnauthenticated {
    /// Fail the call with `AuthRequired`
    #[default]
    Fail,
    /// Fail the call and include a freshly minted login URL in the error
    /// details so the caller can redirect the user
    TriggerLogin,
}

/// HTTP client that attaches the session's bearer token to every request
pub struct AuthedClient {
    session: Arc<SessionManager>,
    client: reqwest::Client,
    on_unauthenticated: OnUnauthenticated,
}

impl AuthedClient {
    /// Create a helper over the shared HTTP client
    #[must_use]
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            client: shared_client().clone(),
            on_unauthenticated: OnUnauthenticated::default(),
        }
    }

    /// Use a custom HTTP client (for timeouts or testing)
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Configure the unauthenticated behavior
    #[must_use]
    pub const fn on_unauthenticated(mut self, mode: OnUnauthenticated) -> Self {
        self.on_unauthenticated = mode;
        self
    }

    /// Perform an authenticated GET request
    pub async fn get(&self, url: &str) -> AppResult<Response> {
        self.request(Method::GET, url).await
    }

    /// Perform an authenticated request with the given method
    ///
    /// # Errors
    ///
    /// `AuthRequired` when no session is present, `SessionExpired` when the
    /// remote endpoint rejects the token even after one forced refresh, or
    /// an internal error when the request itself fails.
    pub async fn request(&self, method: Method, url: &str) -> AppResult<Response> {
        if !self.session.is_authenticated().await {
            return Err(self.unauthenticated_error(AppError::auth_required()).await);
        }

        // Advisory refresh: avoid sending a token that is about to lapse.
        self.session.refresh_if_needed().await;

        let Some(token) = self.session.bearer_token().await else {
            return Err(self.unauthenticated_error(AppError::session_expired()).await);
        };

        let response = self
            .client
            .request(method.clone(), url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| AppError::internal("authenticated request failed").with_source(e))?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // The token was rejected; force one refresh and retry exactly once.
        debug!(url, "Received 401, refreshing and retrying once");
        if !self.session.force_refresh().await {
            return Err(self.unauthenticated_error(AppError::session_expired()).await);
        }

        let Some(token) = self.session.bearer_token().await else {
            return Err(self.unauthenticated_error(AppError::session_expired()).await);
        };

        let retry = self
            .client
            .request(method, url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| AppError::internal("authenticated request failed").with_source(e))?;

        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(url, "Still unauthorized after token refresh");
            return Err(self.unauthenticated_error(AppError::session_expired()).await);
        }

        Ok(retry)
    }

    /// Decorate an authentication failure according to the configured mode
    async fn unauthenticated_error(&self, error: AppError) -> AppError {
        match self.on_unauthenticated {
            OnUnauthenticated::Fail => error,
            OnUnauthenticated::TriggerLogin => match self.session.login(None).await {
                Ok(url) => error.with_details(serde_json::json!({ "login_url": url.as_str() })),
                Err(login_error) => {
                    warn!(error = %login_error, "Failed to build login URL");
                    error
                }
            },
        }
    }
}
