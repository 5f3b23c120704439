// ABOUTME: Core data models for the authentication session and simulated chat
// ABOUTME: Defines the session state machine types, user profile, and persisted snapshot
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Domain models for the session lifecycle and chat surface

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::constants::time::TOKEN_REFRESH_HORIZON_SECONDS;

/// User profile as returned by the identity provider's profile endpoint
///
/// Immutable snapshot, replaced wholesale on login and refresh, never
/// patched field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable user identifier
    pub id: String,
    /// Login name
    #[serde(default)]
    pub username: Option<String>,
    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the email address has been verified
    #[serde(default)]
    pub email_verified: Option<bool>,
    /// Avatar URL
    #[serde(default)]
    pub picture: Option<String>,
    /// Whether the account is disabled
    #[serde(default)]
    pub disabled: Option<bool>,
    /// Free-form provider metadata
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl UserProfile {
    /// Best-effort display name: full name, then username, then a placeholder
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("User")
    }
}

/// Authentication status of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// Initialization or an in-flight refresh is in progress
    Loading,
    /// No authenticated user
    Anonymous,
    /// A live token and user profile are present
    Authenticated,
    /// A terminal failure; cleared by the next explicit login
    Error,
}

/// The current authentication session
///
/// Owned exclusively by [`crate::session::SessionManager`]; everything else
/// reads cheap copies via `snapshot()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque access token, absent when anonymous
    pub access_token: Option<String>,
    /// Opaque refresh token, absent when the provider issued none
    pub refresh_token: Option<String>,
    /// When the access token becomes invalid
    pub expires_at: Option<DateTime<Utc>>,
    /// Cached user profile
    pub user: Option<UserProfile>,
    /// Current lifecycle status
    pub status: AuthStatus,
    /// Last user-visible error message, if any
    pub error: Option<String>,
}

impl Session {
    /// The initial session: loading until `initialize()` resolves it
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            expires_at: None,
            user: None,
            status: AuthStatus::Loading,
            error: None,
        }
    }

    /// An anonymous session, optionally carrying an error message
    #[must_use]
    pub const fn anonymous(error: Option<String>) -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            expires_at: None,
            user: None,
            status: AuthStatus::Anonymous,
            error,
        }
    }

    /// Whether the session currently satisfies the authenticated invariant:
    /// an access token is present, the expiry (when known) is in the future,
    /// and a user profile is cached.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
            && self.access_token.is_some()
            && self.user.is_some()
            && self.expires_at.is_none_or(|at| at > Utc::now())
    }

    /// Whether the access token expires within the refresh horizon
    #[must_use]
    pub fn expires_soon(&self) -> bool {
        self.expires_at.is_some_and(|at| {
            at <= Utc::now() + Duration::seconds(TOKEN_REFRESH_HORIZON_SECONDS)
        })
    }
}

/// A token set returned by the identity provider's token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// The access token string
    pub access_token: String,
    /// Optional refresh token for obtaining new access tokens
    pub refresh_token: Option<String>,
    /// Expiration timestamp (UTC)
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// The persisted session snapshot: the four fields written to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Access token
    pub access_token: String,
    /// Refresh token, when one was issued
    pub refresh_token: Option<String>,
    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,
    /// Cached user profile
    pub user: UserProfile,
}

impl SessionSnapshot {
    /// Whether the stored access token is still live
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// Ephemeral context held only across the login redirect round-trip
///
/// Created at login-initiation, consumed and deleted by the callback
/// handler exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingLoginContext {
    /// Where to send the user after a successful login
    pub return_url: Option<String>,
    /// CSRF state token, verified against the callback's `state` parameter
    pub state: String,
}

/// Role of a chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Sent by the authenticated user
    User,
    /// Sent by the simulated assistant
    Assistant,
}

/// A single message in the simulated conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message identifier
    pub id: String,
    /// Author role
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
}
