// ABOUTME: Application constants and configuration values
// ABOUTME: Centralizes storage keys, environment variable names, and timing defaults
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Application constants
//!
//! Values that can vary per deployment belong in [`crate::config`];
//! everything here is fixed at compile time.

/// Service identifiers used in logging and health responses
pub mod service_names {
    /// The AnyChat server service name
    pub const ANYCHAT_SERVER: &str = "anychat-server";
}

/// Keys for the persisted session snapshot and ephemeral login entries
///
/// The `anychat_` prefix matches the keys the web client used for its
/// local storage entries, keeping stored snapshots recognizable.
pub mod storage_keys {
    /// Access token entry
    pub const ACCESS_TOKEN: &str = "anychat_access_token";
    /// Refresh token entry
    pub const REFRESH_TOKEN: &str = "anychat_refresh_token";
    /// Expiry timestamp entry (epoch milliseconds, stored as a string)
    pub const EXPIRES_AT: &str = "anychat_expires_at";
    /// Serialized user profile entry
    pub const USER: &str = "anychat_user";
    /// Post-login return URL (ephemeral, consumed by the callback handler)
    pub const LOGIN_REDIRECT: &str = "anychat_login_redirect";
    /// CSRF state token (ephemeral, consumed by the callback handler)
    pub const LOGIN_STATE: &str = "anychat_login_state";
}

/// Time-related constants for token lifecycle management
pub mod time {
    /// Refresh the access token when it expires within this horizon
    pub const TOKEN_REFRESH_HORIZON_SECONDS: i64 = 5 * 60;

    /// Fallback token lifetime when the provider omits `expires_in`
    pub const DEFAULT_TOKEN_EXPIRY_SECONDS: i64 = 3600;

    /// Simulated delay before the canned assistant reply
    pub const CHAT_REPLY_DELAY_MS: u64 = 1000;
}

/// Network and protocol tuning values
pub mod network_config {
    /// Length of generated CSRF state tokens
    pub const OAUTH_STATE_LENGTH: usize = 32;

    /// Request timeout for token exchanges (seconds)
    pub const OAUTH_REQUEST_TIMEOUT_SECS: u64 = 15;

    /// Connect timeout for token exchanges (seconds)
    pub const OAUTH_CONNECT_TIMEOUT_SECS: u64 = 5;
}

/// Environment variable names recognized by [`crate::config`]
pub mod env_config {
    /// HTTP port override
    pub const HTTP_PORT: &str = "ANYCHAT_HTTP_PORT";
    /// Public base URL of this server
    pub const BASE_URL: &str = "ANYCHAT_BASE_URL";
    /// Deployment environment (development, production, testing)
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Session snapshot file override
    pub const STORAGE_PATH: &str = "ANYCHAT_STORAGE_PATH";
    /// Identity provider client ID
    pub const CLIENT_ID: &str = "ANYAUTH_CLIENT_ID";
    /// Identity provider client secret
    pub const CLIENT_SECRET: &str = "ANYAUTH_CLIENT_SECRET";
    /// Identity provider authorization endpoint
    pub const AUTH_URL: &str = "ANYAUTH_AUTH_URL";
    /// Identity provider token endpoint
    pub const TOKEN_URL: &str = "ANYAUTH_TOKEN_URL";
    /// Identity provider profile endpoint
    pub const USERINFO_URL: &str = "ANYAUTH_USERINFO_URL";
    /// OAuth redirect URI override
    pub const REDIRECT_URI: &str = "ANYAUTH_REDIRECT_URI";
    /// OAuth scopes override (space-separated)
    pub const SCOPES: &str = "ANYAUTH_SCOPES";
}

/// Default endpoint and port values for local development
pub mod defaults {
    /// Default HTTP port for the AnyChat server
    pub const HTTP_PORT: u16 = 3010;
    /// Default public base URL of this server
    pub const BASE_URL: &str = "http://localhost:3010";
    /// Default AnyAuth authorization endpoint
    pub const AUTH_URL: &str = "http://localhost:3000/login";
    /// Default AnyAuth token endpoint (both grant types)
    pub const TOKEN_URL: &str = "http://localhost:3000/api/auth/token";
    /// Default AnyAuth profile endpoint
    pub const USERINFO_URL: &str = "http://localhost:3000/api/me";
    /// Default OAuth client ID
    pub const CLIENT_ID: &str = "anychat_client";
    /// Default OAuth scopes
    pub const SCOPES: &str = "openid profile";
}

/// Route paths shared between handlers and redirect construction
pub mod routes {
    /// OAuth callback path on this server
    pub const AUTH_CALLBACK: &str = "/auth/callback";
    /// Application home route
    pub const HOME: &str = "/";
    /// Login initiation path
    pub const LOGIN: &str = "/api/auth/login";
}
