// ABOUTME: Session manager implementing the authentication state machine
// ABOUTME: Handles initialization, login redirects, callbacks, logout, and silent refresh
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::{AppError, AppResult};
use crate::models::{
    AuthStatus, PendingLoginContext, Session, SessionSnapshot, TokenSet, UserProfile,
};
use crate::oauth2_client::{generate_state, OAuth2Client};
use crate::token_store::TokenStore;

/// Parameters extracted from the provider's redirect callback
///
/// Exactly one redirect shape is supported: an opaque `code` plus the
/// echoed `state`, or an `error` from the provider. Tokens are never
/// accepted directly in the redirect.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    /// Authorization code to exchange
    pub code: Option<String>,
    /// Echoed CSRF state token
    pub state: Option<String>,
    /// Error identifier reported by the provider
    pub error: Option<String>,
    /// Optional human-readable error description from the provider
    pub error_description: Option<String>,
}

/// Owner of the authentication session
///
/// All session reads and writes flow through this type; consumers receive
/// it as `Arc<SessionManager>` and read cheap copies via [`Self::snapshot`].
pub struct SessionManager {
    client: OAuth2Client,
    store: TokenStore,
    session: RwLock<Session>,
    initialized: AtomicBool,
    // Single-flight guard: one in-flight refresh, concurrent callers wait
    // on the lock and re-check the horizon once the leader finishes.
    refresh_guard: Mutex<()>,
}

impl SessionManager {
    /// Create a session manager over the given exchange client and store
    #[must_use]
    pub fn new(client: OAuth2Client, store: TokenStore) -> Self {
        Self {
            client,
            store,
            session: RwLock::new(Session::loading()),
            initialized: AtomicBool::new(false),
            refresh_guard: Mutex::new(()),
        }
    }

    /// Restore the session from storage, once per process start
    ///
    /// A live stored token is adopted without any network call. An expired
    /// token with a refresh token triggers exactly one refresh attempt;
    /// on failure storage is cleared and the session degrades to anonymous
    /// with a user-visible message. Re-entry is a guarded no-op, so
    /// concurrent callers are safe.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        match self.store.load() {
            Ok(Some(snapshot)) if snapshot.is_live() => {
                info!(user_id = %snapshot.user.id, "Restored live session from storage");
                self.adopt_snapshot(snapshot).await;
            }
            Ok(Some(snapshot)) => match snapshot.refresh_token {
                Some(refresh_token) => {
                    debug!("Stored token expired, attempting refresh");
                    if let Err(e) = self.do_refresh(&refresh_token).await {
                        warn!(error = %e, "Refresh on startup failed");
                        self.reset_to_anonymous(Some(
                            "Session expired. Please log in again.".to_owned(),
                        ))
                        .await;
                    } else {
                        info!("Session refreshed on startup");
                    }
                }
                None => {
                    debug!("Stored token expired with no refresh token");
                    self.reset_to_anonymous(None).await;
                }
            },
            Ok(None) => {
                let mut session = self.session.write().await;
                *session = Session::anonymous(None);
            }
            Err(e) => {
                warn!(error = %e, "Failed to load stored session, clearing storage");
                self.reset_to_anonymous(Some(
                    "Failed to load authentication state.".to_owned(),
                ))
                .await;
            }
        }
    }

    /// Start a login: record the pending context and return the provider
    /// authorization URL to redirect the user to.
    ///
    /// # Errors
    ///
    /// Returns an error when the pending context cannot be persisted or the
    /// authorization endpoint is misconfigured.
    pub async fn login(&self, return_url: Option<String>) -> AppResult<Url> {
        let state = generate_state();
        self.store.save_pending_login(&PendingLoginContext {
            return_url,
            state: state.clone(),
        })?;

        let url = self.client.authorization_url(&state)?;

        // A new login attempt leaves the terminal error state behind.
        {
            let mut session = self.session.write().await;
            if session.status == AuthStatus::Error {
                *session = Session::anonymous(None);
            }
        }

        info!("Login initiated, redirecting to authorization endpoint");
        Ok(url)
    }

    /// Process the provider's redirect callback
    ///
    /// Consumes the pending login context exactly once, verifies the CSRF
    /// `state`, exchanges the code, fetches the profile, persists the
    /// result, and transitions to authenticated. Returns the saved
    /// post-login return URL, if any.
    ///
    /// # Errors
    ///
    /// Any failure transitions the session to the error state and is
    /// surfaced to the caller; the exchange endpoint is never contacted
    /// when the provider reported an error or the state does not match.
    pub async fn handle_callback(&self, params: CallbackParams) -> AppResult<Option<String>> {
        // The redirect round-trip is over either way; the pending context
        // must not survive to a second callback.
        let pending = self.store.take_pending_login().unwrap_or(None);

        if let Some(error) = params.error {
            let message = params
                .error_description
                .unwrap_or_else(|| format!("The identity provider reported: {error}"));
            return Err(self.fail_callback(AppError::callback_failed(message)).await);
        }

        let Some(code) = params.code else {
            return Err(self
                .fail_callback(AppError::missing_parameter("code"))
                .await);
        };

        let Some(pending) = pending else {
            return Err(self
                .fail_callback(AppError::callback_failed("no login in progress"))
                .await);
        };

        if params.state.as_deref() != Some(pending.state.as_str()) {
            warn!("Callback state does not match the recorded login state");
            return Err(self
                .fail_callback(AppError::callback_failed("state parameter mismatch"))
                .await);
        }

        let tokens = match self.client.exchange_code(&code).await {
            Ok(tokens) => tokens,
            Err(e) => return Err(self.fail_callback(e).await),
        };

        let profile = match self.client.fetch_profile(&tokens.access_token).await {
            Ok(profile) => profile,
            Err(e) => return Err(self.fail_callback(e).await),
        };

        if let Err(e) = self.adopt(tokens, profile).await {
            return Err(self.fail_callback(e).await);
        }

        info!("Authentication completed successfully");
        Ok(pending.return_url)
    }

    /// Clear the session and storage, transitioning to anonymous
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session storage on logout");
        }
        let mut session = self.session.write().await;
        *session = Session::anonymous(None);
        info!("Logged out");
    }

    /// Refresh the access token when it expires within the 5-minute horizon
    ///
    /// Returns whether the session remains valid afterwards. Sessions
    /// without a refresh token (or not authenticated at all) have nothing
    /// to refresh and report `true`. Concurrent callers share a single
    /// in-flight refresh rather than issuing parallel requests.
    pub async fn refresh_if_needed(&self) -> bool {
        {
            let session = self.session.read().await;
            if session.status != AuthStatus::Authenticated || session.refresh_token.is_none() {
                return true;
            }
            if !session.expires_soon() {
                return true;
            }
        }

        let _guard = self.refresh_guard.lock().await;

        // A leader may have refreshed while we waited for the guard.
        let refresh_token = {
            let session = self.session.read().await;
            if !session.expires_soon() {
                return session.is_authenticated();
            }
            match &session.refresh_token {
                Some(token) => token.clone(),
                None => return session.is_authenticated(),
            }
        };

        match self.do_refresh(&refresh_token).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.expire_session().await;
                false
            }
        }
    }

    /// Refresh unconditionally, used after a remote endpoint rejected the
    /// bearer token. Returns whether the session is valid afterwards.
    pub async fn force_refresh(&self) -> bool {
        let _guard = self.refresh_guard.lock().await;

        let refresh_token = {
            let session = self.session.read().await;
            match &session.refresh_token {
                Some(token) => token.clone(),
                None => return false,
            }
        };

        match self.do_refresh(&refresh_token).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Forced token refresh failed");
                self.expire_session().await;
                false
            }
        }
    }

    /// Cheap copy of the current session for route handlers and UI reads
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    /// The current bearer token, when authenticated
    pub async fn bearer_token(&self) -> Option<String> {
        let session = self.session.read().await;
        if session.is_authenticated() {
            session.access_token.clone()
        } else {
            None
        }
    }

    /// Whether the session currently satisfies the authenticated invariant
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    /// Exchange client in use (the provider endpoints it is bound to)
    #[must_use]
    pub const fn client(&self) -> &OAuth2Client {
        &self.client
    }

    /// Refresh tokens, re-fetch the profile, and persist the result
    async fn do_refresh(&self, refresh_token: &str) -> AppResult<()> {
        let mut tokens = self.client.refresh_token(refresh_token).await?;
        // Providers may rotate or omit the refresh token; keep the old one
        // when none is returned.
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token.to_owned());
        }

        let profile = self.client.fetch_profile(&tokens.access_token).await?;
        self.adopt(tokens, profile).await
    }

    /// Persist a fresh token set and profile, then mark the session
    /// authenticated. Storage is written before the in-memory state flips
    /// so a reload never observes a session that storage has no record of.
    async fn adopt(&self, tokens: TokenSet, user: UserProfile) -> AppResult<()> {
        let snapshot = SessionSnapshot {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: tokens.expires_at,
            user,
        };
        self.store.save(&snapshot)?;
        self.adopt_snapshot(snapshot).await;
        Ok(())
    }

    async fn adopt_snapshot(&self, snapshot: SessionSnapshot) {
        let mut session = self.session.write().await;
        *session = Session {
            access_token: Some(snapshot.access_token),
            refresh_token: snapshot.refresh_token,
            expires_at: Some(snapshot.expires_at),
            user: Some(snapshot.user),
            status: AuthStatus::Authenticated,
            error: None,
        };
    }

    /// Clear storage and degrade to anonymous, optionally with a message
    async fn reset_to_anonymous(&self, error: Option<String>) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session storage");
        }
        let mut session = self.session.write().await;
        *session = Session::anonymous(error);
    }

    /// Refresh options are exhausted; the user must log in again
    async fn expire_session(&self) {
        self.reset_to_anonymous(Some("Session expired. Please log in again.".to_owned()))
            .await;
    }

    /// Record a callback failure in the session and pass the error through
    async fn fail_callback(&self, error: AppError) -> AppError {
        warn!(error = %error, "Error processing auth callback");
        let mut session = self.session.write().await;
        session.status = AuthStatus::Error;
        session.error = Some(error.message.clone());
        error
    }
}
