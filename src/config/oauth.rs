// ABOUTME: OAuth configuration for the AnyAuth identity provider
// ABOUTME: Loads endpoints, client credentials, and scopes from the environment
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::constants::{defaults, env_config, routes};

/// Identity provider settings for the OAuth2 authorization-code flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthProviderSettings {
    /// OAuth client ID registered with AnyAuth
    pub client_id: String,
    /// OAuth client secret, injected server-side and never sent to browsers
    pub client_secret: Option<String>,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL (authorization-code and refresh-token grants)
    pub token_url: String,
    /// Profile endpoint URL
    pub userinfo_url: String,
    /// Redirect URI registered for this client
    pub redirect_uri: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
}

impl AuthProviderSettings {
    /// Load provider settings from the environment, falling back to the
    /// local-development defaults.
    #[must_use]
    pub fn from_env(base_url: &str) -> Self {
        let scopes = env::var(env_config::SCOPES)
            .unwrap_or_else(|_| defaults::SCOPES.to_owned())
            .split_whitespace()
            .map(str::to_owned)
            .collect();

        Self {
            client_id: env::var(env_config::CLIENT_ID)
                .unwrap_or_else(|_| defaults::CLIENT_ID.to_owned()),
            client_secret: env::var(env_config::CLIENT_SECRET).ok(),
            auth_url: env::var(env_config::AUTH_URL)
                .unwrap_or_else(|_| defaults::AUTH_URL.to_owned()),
            token_url: env::var(env_config::TOKEN_URL)
                .unwrap_or_else(|_| defaults::TOKEN_URL.to_owned()),
            userinfo_url: env::var(env_config::USERINFO_URL)
                .unwrap_or_else(|_| defaults::USERINFO_URL.to_owned()),
            redirect_uri: env::var(env_config::REDIRECT_URI)
                .unwrap_or_else(|_| format!("{base_url}{}", routes::AUTH_CALLBACK)),
            scopes,
        }
    }

    /// Validate provider settings and log diagnostics.
    /// Returns true when the configuration is usable.
    pub fn validate_and_log(&self) -> bool {
        if self.client_id.is_empty() {
            warn!("OAuth client ID is empty; logins will be rejected by the provider");
            return false;
        }

        if self.client_secret.is_none() {
            warn!(
                "No OAuth client secret configured ({}); the token pass-through \
                 route will exchange codes without client authentication",
                env_config::CLIENT_SECRET
            );
        }

        info!(
            client_id = %self.client_id,
            auth_url = %self.auth_url,
            token_url = %self.token_url,
            redirect_uri = %self.redirect_uri,
            "OAuth provider configured"
        );
        true
    }
}
