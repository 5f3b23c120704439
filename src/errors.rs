// ABOUTME: Unified error handling system with standard error codes and HTTP responses
// ABOUTME: Maps session lifecycle failures to stable codes and JSON error bodies
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! # Unified Error Handling System
//!
//! Defines the error taxonomy for the authentication session lifecycle and
//! the HTTP surface. Every failure resolves to a stable [`ErrorCode`] with a
//! defined HTTP status and a JSON response body; no failure path is allowed
//! to leave the session state machine undefined.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Callback & parameter validation (1000-1999)
    /// A redirect callback arrived without a required field
    #[serde(rename = "MISSING_PARAMETER")]
    MissingParameter = 1000,
    /// The callback could not be processed (provider error or CSRF mismatch)
    #[serde(rename = "CALLBACK_FAILED")]
    CallbackFailed = 1001,

    // Token lifecycle (2000-2999)
    /// The token endpoint rejected the authorization code
    #[serde(rename = "EXCHANGE_FAILED")]
    ExchangeFailed = 2000,
    /// The token endpoint rejected the refresh token
    #[serde(rename = "REFRESH_FAILED")]
    RefreshFailed = 2001,
    /// Refresh options are exhausted; the user must log in again
    #[serde(rename = "SESSION_EXPIRED")]
    SessionExpired = 2002,
    /// A protected operation was attempted without an authenticated session
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired = 2003,

    // External services (3000-3999)
    /// The profile endpoint returned a non-success response
    #[serde(rename = "PROFILE_FETCH_FAILED")]
    ProfileFetchFailed = 3000,

    // Storage (4000-4999)
    /// The persisted session snapshot could not be parsed
    #[serde(rename = "STORAGE_CORRUPT")]
    StorageCorrupt = 4000,
    /// A storage read or write failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 4001,

    // Configuration (6000-6999)
    /// Configuration error encountered
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Internal errors (9000-9999)
    /// An unexpected internal error occurred
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            // 400 Bad Request
            Self::MissingParameter | Self::CallbackFailed => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            Self::ExchangeFailed
            | Self::RefreshFailed
            | Self::SessionExpired
            | Self::AuthRequired => StatusCode::UNAUTHORIZED,

            // 502 Bad Gateway
            Self::ProfileFetchFailed => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::StorageCorrupt
            | Self::StorageError
            | Self::ConfigError
            | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a human-readable description for this error code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::MissingParameter => "A required parameter is missing",
            Self::CallbackFailed => "The authentication callback could not be processed",
            Self::ExchangeFailed => "Failed to exchange the authorization code for tokens",
            Self::RefreshFailed => "Failed to refresh the access token",
            Self::SessionExpired => "The session has expired",
            Self::AuthRequired => "Authentication required",
            Self::ProfileFetchFailed => "Failed to fetch the user profile",
            Self::StorageCorrupt => "The stored session snapshot is unreadable",
            Self::StorageError => "Session storage operation failed",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional key-value context included in the HTTP response
    pub details: serde_json::Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
            source: None,
        }
    }

    /// Add details to the error response body
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Error payload within an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Stable error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context, omitted when empty
    #[serde(skip_serializing_if = "serde_json::Value::is_null", default)]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                details: error.details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

/// Convenience constructors for the session lifecycle taxonomy
impl AppError {
    /// A callback arrived without a required field
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MissingParameter,
            format!("Missing required parameter: {}", name.into()),
        )
    }

    /// The callback could not be processed
    pub fn callback_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CallbackFailed, message)
    }

    /// The token endpoint rejected the authorization code
    pub fn exchange_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExchangeFailed, message)
    }

    /// The token endpoint rejected the refresh token
    pub fn refresh_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RefreshFailed, message)
    }

    /// Refresh options are exhausted
    #[must_use]
    pub fn session_expired() -> Self {
        Self::new(
            ErrorCode::SessionExpired,
            "Session expired. Please log in again.",
        )
    }

    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// The profile endpoint returned a non-success response
    pub fn profile_fetch_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProfileFetchFailed, message)
    }

    /// The persisted snapshot could not be parsed
    pub fn storage_corrupt(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageCorrupt, message)
    }

    /// A storage read or write failed
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // Keep the root cause visible for error chaining
        match error.source() {
            Some(source) => Self::new(ErrorCode::InternalError, error.to_string()).with_details(
                serde_json::json!({
                    "source": source.to_string()
                }),
            ),
            None => Self::new(ErrorCode::InternalError, error.to_string()),
        }
    }
}
