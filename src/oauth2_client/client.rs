// ABOUTME: OAuth2 client implementation for AnyAuth authentication
// ABOUTME: Handles code exchange, token refresh, and profile fetch against the provider
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

use chrono::{Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use url::Url;

use crate::config::AuthProviderSettings;
use crate::constants::{network_config, time};
use crate::errors::{AppError, AppResult};
use crate::models::{TokenSet, UserProfile};
use crate::utils::http_client::oauth_client;

/// Generate a random CSRF `state` token
///
/// Recorded at login-initiation and verified against the callback's
/// `state` parameter before any code is trusted.
#[must_use]
pub fn generate_state() -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..network_config::OAUTH_STATE_LENGTH)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}

/// OAuth 2.0 client for the AnyAuth identity provider
pub struct OAuth2Client {
    settings: AuthProviderSettings,
    client: reqwest::Client,
}

impl OAuth2Client {
    /// Create a new `OAuth2` client with the given provider settings
    #[must_use]
    pub fn new(settings: AuthProviderSettings) -> Self {
        Self {
            settings,
            client: oauth_client(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing)
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Get the provider settings
    #[must_use]
    pub const fn settings(&self) -> &AuthProviderSettings {
        &self.settings
    }

    /// Build the authorization URL to redirect the user to
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization URL is malformed.
    pub fn authorization_url(&self, state: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.settings.auth_url)
            .map_err(|e| AppError::config("invalid authorization URL").with_source(e))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.settings.scopes.join(" "))
            .append_pair("state", state);

        Ok(url)
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ErrorCode::ExchangeFailed`] when the request
    /// fails or the token endpoint returns a non-success response; the
    /// response body is surfaced as error detail.
    pub async fn exchange_code(&self, code: &str) -> AppResult<TokenSet> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("client_id", self.settings.client_id.as_str()),
        ];

        let mut request = self.client.post(&self.settings.token_url).form(&params);
        if let Some(secret) = &self.settings.client_secret {
            request = request.basic_auth(&self.settings.client_id, Some(secret));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::internal("token endpoint unreachable").with_source(e))?;

        let response = Self::ensure_success(response, AppError::exchange_failed).await?;
        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::exchange_failed("invalid token response").with_source(e))?;

        Ok(Self::token_set_from_response(token_response))
    }

    /// Refresh an expired access token
    ///
    /// Callers must not run this concurrently for overlapping refresh
    /// tokens; [`crate::session::SessionManager`] serializes refreshes
    /// behind a single-flight guard.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ErrorCode::RefreshFailed`] when the request
    /// fails or the token endpoint returns a non-success response.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenSet> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let mut request = self.client.post(&self.settings.token_url).form(&params);
        if let Some(secret) = &self.settings.client_secret {
            request = request.basic_auth(&self.settings.client_id, Some(secret));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::refresh_failed("token endpoint unreachable").with_source(e))?;

        let response = Self::ensure_success(response, AppError::refresh_failed).await?;
        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::refresh_failed("invalid token response").with_source(e))?;

        Ok(Self::token_set_from_response(token_response))
    }

    /// Fetch the user profile with a bearer token
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ErrorCode::ProfileFetchFailed`] when the
    /// request fails or the profile endpoint returns a non-success response.
    pub async fn fetch_profile(&self, access_token: &str) -> AppResult<UserProfile> {
        let response = self
            .client
            .get(&self.settings.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                AppError::profile_fetch_failed("profile endpoint unreachable").with_source(e)
            })?;

        let response = Self::ensure_success(response, AppError::profile_fetch_failed).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::profile_fetch_failed("invalid profile response").with_source(e))
    }

    /// Check the response status; surface the body as error detail on failure
    async fn ensure_success(
        response: reqwest::Response,
        make_error: impl Fn(String) -> AppError,
    ) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(
            make_error(format!("provider returned HTTP {status}")).with_details(
                serde_json::json!({
                    "status": status,
                    "body": body,
                }),
            ),
        )
    }

    /// Compute `expires_at = now + expires_in` from the wire response
    fn token_set_from_response(response: TokenResponse) -> TokenSet {
        let expires_in = response.expires_in.map_or(
            time::DEFAULT_TOKEN_EXPIRY_SECONDS,
            |seconds| i64::try_from(seconds).unwrap_or(time::DEFAULT_TOKEN_EXPIRY_SECONDS),
        );

        TokenSet {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }
}

/// OAuth 2.0 token response from the provider
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// The access token issued by the authorization server
    access_token: String,
    /// Token lifetime in seconds
    expires_in: Option<u64>,
    /// Refresh token for obtaining new access tokens
    refresh_token: Option<String>,
}
