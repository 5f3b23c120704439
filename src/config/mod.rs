// ABOUTME: Configuration management for deployment-specific settings
// ABOUTME: Groups environment-driven server and identity-provider configuration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Configuration management
//!
//! All configuration is environment-driven; see [`environment::ServerConfig::from_env`].

/// Environment-based server configuration
pub mod environment;
/// Identity provider (AnyAuth) endpoints and client credentials
pub mod oauth;

pub use environment::{Environment, ServerConfig};
pub use oauth::AuthProviderSettings;
