// ABOUTME: Test helper module organization
// ABOUTME: Exposes the axum oneshot request helper to integration tests
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

pub mod axum_test;
