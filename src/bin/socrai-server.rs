// ABOUTME: Server binary for the SocrAI mentor API
// ABOUTME: Loads environment configuration, applies CLI overrides and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! # SocrAI Server Binary
//!
//! Starts the HTTP API with `SQLite` persistence and the configured
//! `OpenAI`-compatible model endpoint.

use anyhow::Result;
use clap::Parser;
use socrai_server::{config::ServerConfig, logging, server};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "socrai-server")]
#[command(about = "SocrAI - Socratic coding mentor API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!(
        environment = %config.environment,
        host = %config.host,
        http_port = config.http_port,
        database_url = %config.database_url,
        "Starting SocrAI server"
    );

    if let Err(e) = server::serve(config).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    info!("Server stopped");
    Ok(())
}
