// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Environment-based configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::config::oauth::AuthProviderSettings;
use crate::constants::{defaults, env_config};

/// Environment type for logging and CORS behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (permissive CORS, pretty logs)
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port to bind
    pub http_port: u16,
    /// Public base URL of this server (used to build the redirect URI)
    pub base_url: String,
    /// Deployment environment
    pub environment: Environment,
    /// Session snapshot file override; platform data dir when absent
    pub storage_path: Option<PathBuf>,
    /// Identity provider settings
    pub oauth: AuthProviderSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but unparseable
    /// (e.g. a non-numeric port).
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var(env_config::HTTP_PORT) {
            Ok(port) => port
                .parse::<u16>()
                .with_context(|| format!("invalid {}: {port}", env_config::HTTP_PORT))?,
            Err(_) => defaults::HTTP_PORT,
        };

        let base_url =
            env::var(env_config::BASE_URL).unwrap_or_else(|_| defaults::BASE_URL.to_owned());

        let environment = Environment::from_str_or_default(
            &env::var(env_config::ENVIRONMENT).unwrap_or_default(),
        );

        let storage_path = env::var(env_config::STORAGE_PATH).ok().map(PathBuf::from);

        let oauth = AuthProviderSettings::from_env(&base_url);

        Ok(Self {
            http_port,
            base_url,
            environment,
            storage_path,
            oauth,
        })
    }

    /// One-line configuration summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} http_port={} base_url={} provider={}",
            self.environment, self.http_port, self.base_url, self.oauth.auth_url
        )
    }
}
