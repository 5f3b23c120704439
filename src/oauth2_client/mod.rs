// ABOUTME: OAuth2 client module for the AnyAuth identity provider
// ABOUTME: Exposes the token exchange client and CSRF state generation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! `OAuth2` authorization-code client
//!
//! Performs the three network calls of the session lifecycle: exchanging an
//! authorization code for tokens, refreshing an access token, and fetching
//! the user profile. The session state machine in [`crate::session`] owns
//! when these calls happen; this module only speaks the wire protocol.

mod client;

pub use client::{generate_state, OAuth2Client};
