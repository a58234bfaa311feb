// ABOUTME: Server binary for the Blackbeard GitHub Copilot extension
// ABOUTME: Loads configuration, applies CLI overrides, initializes logging, and serves
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Blackbeard Extension Server Binary

use std::net::IpAddr;

use anyhow::Result;
use blackbeard_extension::{config::ServerConfig, logging, server};
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "blackbeard-extension")]
#[command(about = "Blackbeard pirate agent for GitHub Copilot")]
#[command(version)]
pub struct Args {
    /// Override listen port (`PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Override bind address (`HOST`)
    #[arg(long)]
    host: Option<IpAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    logging::init_from_env()?;
    info!("Starting Blackbeard Copilot extension");

    if let Err(e) = server::run(config).await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
