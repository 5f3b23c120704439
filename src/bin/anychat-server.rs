// ABOUTME: AnyChat server binary serving the OAuth2 session lifecycle and chat demo
// ABOUTME: Loads configuration, initializes logging, and runs the axum HTTP server
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! # AnyChat Server Binary
//!
//! Starts the AnyChat demo server: restores any persisted session, then
//! serves the authentication and chat routes until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use anychat::config::ServerConfig;
use anychat::logging;
use anychat::resources::ServerResources;
use anychat::routes;

#[derive(Parser)]
#[command(name = "anychat-server")]
#[command(about = "AnyChat - demo chat gated by an OAuth2 session lifecycle")]
struct Args {
    /// Override the HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the session storage file
    #[arg(long)]
    storage_path: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(storage_path) = args.storage_path {
        config.storage_path = Some(storage_path);
    }

    logging::init_from_env()?;

    info!("Starting AnyChat server");
    info!("{}", config.summary());
    config.oauth.validate_and_log();

    let http_port = config.http_port;
    let resources = Arc::new(ServerResources::new(config)?);

    // Restore any persisted session before accepting traffic; an expired
    // snapshot triggers the one startup refresh here.
    resources.session.initialize().await;

    let app = routes::router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", http_port))
        .await
        .with_context(|| format!("failed to bind port {http_port}"))?;
    info!("Listening on http://0.0.0.0:{http_port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // Shut down cleanly on ctrl-c; in-flight exchanges are simply discarded
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to install shutdown signal handler");
    }
}
