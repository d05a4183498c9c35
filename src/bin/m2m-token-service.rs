// ABOUTME: Server binary for the client-credentials token service
// ABOUTME: Loads configuration, keys and the client registry, then serves the token endpoints
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # M2M Token Service Binary
//!
//! Issues and introspects RS256 access tokens for statically registered
//! machine-to-machine clients.

use anyhow::Result;
use clap::Parser;
use m2m_token_service::{
    config::ServerConfig,
    constants::paths,
    logging,
    server::{bootstrap, serve},
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "m2m-token-service")]
#[command(about = "Client-credentials OAuth2 token service issuing RS256 access tokens")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override client registry file path
    #[arg(long)]
    clients: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(clients) = args.clients {
        config.clients_path = clients;
    }

    info!("{}", config.summary());

    let service = bootstrap(&config).inspect_err(|e| {
        error!("Startup failed: {e}");
    })?;

    display_available_endpoints(&config);

    if let Err(e) = serve(&config, service).await {
        error!("Server error: {e}");
        return Err(e.into());
    }

    Ok(())
}

/// Display the endpoints this process serves
#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(config: &ServerConfig) {
    let address = config.bind_address();

    info!("=== Available API Endpoints ===");
    info!("   Token:       POST http://{address}{}", paths::TOKEN);
    info!("   Token Info:  GET  http://{address}{}", paths::TOKEN_INFO);
    info!("   Health:      GET  http://{address}{}", paths::HEALTH);
    info!("   Ready:       GET  http://{address}{}", paths::READY);
    info!("=== End of Endpoint List ===");
}
