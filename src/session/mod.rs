// ABOUTME: Session state machine module owning the authentication lifecycle
// ABOUTME: Exposes the session manager and callback parameter types
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Authentication session lifecycle
//!
//! The session state machine: `Loading -> {Anonymous, Authenticated, Error}`,
//! `Authenticated -> {refreshing, Anonymous}`. [`SessionManager`] is the
//! exclusive owner of the in-memory [`crate::models::Session`] and the only
//! component that reads or writes the token store.

mod manager;

pub use manager::{CallbackParams, SessionManager};
