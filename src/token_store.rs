// ABOUTME: Persistent key-value storage for the session snapshot and login context
// ABOUTME: Atomic file-backed analog of the web client's local storage entries
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Token store
//!
//! Wraps a single JSON file of string key-value entries: the four persisted
//! session fields (access token, refresh token, expiry epoch-ms, serialized
//! user profile) plus two ephemeral entries held across the login redirect
//! (return URL and CSRF state). Writes go through a temporary file and a
//! rename so a crash mid-write never leaves a half-populated snapshot.
//!
//! No network or validation logic lives here; [`crate::session`] is the
//! only caller.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::DateTime;

use crate::config::ServerConfig;
use crate::constants::storage_keys;
use crate::errors::{AppError, AppResult};
use crate::models::{PendingLoginContext, SessionSnapshot, UserProfile};

/// File-backed key-value store for session persistence
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store backed by the given file path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the configured location, defaulting to the
    /// platform data directory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ErrorCode::ConfigError`] when no storage
    /// location can be determined.
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        if let Some(path) = &config.storage_path {
            return Ok(Self::new(path.clone()));
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| AppError::config("no platform data directory available"))?;
        Ok(Self::new(data_dir.join("anychat").join("session.json")))
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session snapshot.
    ///
    /// Returns `Ok(None)` when no complete snapshot is stored. A stored but
    /// unparseable snapshot yields `StorageCorrupt`; the caller is expected
    /// to clear the store and degrade to anonymous.
    pub fn load(&self) -> AppResult<Option<SessionSnapshot>> {
        let entries = self.read_entries()?;

        let (Some(access_token), Some(expires_at), Some(user)) = (
            entries.get(storage_keys::ACCESS_TOKEN),
            entries.get(storage_keys::EXPIRES_AT),
            entries.get(storage_keys::USER),
        ) else {
            return Ok(None);
        };

        let expires_ms: i64 = expires_at
            .parse()
            .map_err(|_| AppError::storage_corrupt("expiry timestamp is not an integer"))?;
        let expires_at = DateTime::from_timestamp_millis(expires_ms)
            .ok_or_else(|| AppError::storage_corrupt("expiry timestamp is out of range"))?;

        let user: UserProfile = serde_json::from_str(user)
            .map_err(|e| AppError::storage_corrupt("user profile is unreadable").with_source(e))?;

        Ok(Some(SessionSnapshot {
            access_token: access_token.clone(),
            refresh_token: entries.get(storage_keys::REFRESH_TOKEN).cloned(),
            expires_at,
            user,
        }))
    }

    /// Persist a session snapshot. All four fields are written in one
    /// atomic replacement of the backing file.
    pub fn save(&self, snapshot: &SessionSnapshot) -> AppResult<()> {
        // A corrupt file is about to be overwritten wholesale; start fresh.
        let mut entries = self.read_entries().unwrap_or_default();

        entries.insert(
            storage_keys::ACCESS_TOKEN.to_owned(),
            snapshot.access_token.clone(),
        );
        match &snapshot.refresh_token {
            Some(token) => {
                entries.insert(storage_keys::REFRESH_TOKEN.to_owned(), token.clone());
            }
            None => {
                entries.remove(storage_keys::REFRESH_TOKEN);
            }
        }
        entries.insert(
            storage_keys::EXPIRES_AT.to_owned(),
            snapshot.expires_at.timestamp_millis().to_string(),
        );
        let user = serde_json::to_string(&snapshot.user)
            .map_err(|e| AppError::storage("failed to serialize user profile").with_source(e))?;
        entries.insert(storage_keys::USER.to_owned(), user);

        self.write_entries(&entries)
    }

    /// Remove every stored entry, session fields and ephemeral login
    /// context alike.
    pub fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::storage("failed to clear session storage").with_source(e)),
        }
    }

    /// Record the pending login context before redirecting to the provider
    pub fn save_pending_login(&self, pending: &PendingLoginContext) -> AppResult<()> {
        let mut entries = self.read_entries().unwrap_or_default();

        entries.insert(storage_keys::LOGIN_STATE.to_owned(), pending.state.clone());
        match &pending.return_url {
            Some(url) => {
                entries.insert(storage_keys::LOGIN_REDIRECT.to_owned(), url.clone());
            }
            None => {
                entries.remove(storage_keys::LOGIN_REDIRECT);
            }
        }

        self.write_entries(&entries)
    }

    /// Consume the pending login context. Reading deletes it, so the
    /// callback handler observes it at most once.
    pub fn take_pending_login(&self) -> AppResult<Option<PendingLoginContext>> {
        let mut entries = self.read_entries().unwrap_or_default();

        let state = entries.remove(storage_keys::LOGIN_STATE);
        let return_url = entries.remove(storage_keys::LOGIN_REDIRECT);

        let Some(state) = state else {
            return Ok(None);
        };

        self.write_entries(&entries)?;
        Ok(Some(PendingLoginContext { return_url, state }))
    }

    fn read_entries(&self) -> AppResult<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(AppError::storage("failed to read session storage").with_source(e))
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| AppError::storage_corrupt("session storage is not valid JSON").with_source(e))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::storage("failed to create storage directory").with_source(e))?;
        }

        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::storage("failed to serialize session storage").with_source(e))?;

        // Write-then-rename keeps the snapshot atomic from the reader's
        // perspective: either the old file or the new one, never a torn mix.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)
            .map_err(|e| AppError::storage("failed to write session storage").with_source(e))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::storage("failed to replace session storage").with_source(e))?;

        Ok(())
    }
}
