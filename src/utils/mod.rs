// ABOUTME: Shared utility modules for HTTP client management
// ABOUTME: Houses cross-cutting helpers that do not belong to a single domain
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

/// Shared HTTP client construction with pooling and timeouts
pub mod http_client;
