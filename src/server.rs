// ABOUTME: Server assembly for the token service: startup wiring, router and listener
// ABOUTME: Loads keys and the client registry eagerly, then serves until Ctrl-C
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Server
//!
//! Everything expensive (key parsing, registry loading) happens in
//! [`bootstrap`] before the listener binds. A failure there aborts startup;
//! request handlers only ever see fully initialized, immutable state.

use crate::config::{load_client_records, JwtConfig, ServerConfig};
use crate::crypto::SigningKeys;
use crate::errors::{AppError, AppResult};
use crate::oauth2_server::{
    ClientRecord, ClientRegistry, CredentialValidator, OAuth2Routes, PasswordHashVerifier,
    ScopePolicy, TokenIssuer, TokenService, TokenVerifier,
};
use crate::routes::HealthRoutes;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Wire the token service from loaded keys and registry records
///
/// # Errors
///
/// Returns a configuration error if the token lifetime is unusable
pub fn build_token_service(
    jwt: &JwtConfig,
    keys: SigningKeys,
    records: Vec<ClientRecord>,
) -> AppResult<TokenService> {
    let keys = Arc::new(keys);
    let registry = Arc::new(ClientRegistry::new(records));
    if registry.is_empty() {
        warn!("Client registry is empty; every token request will be rejected");
    }

    let validator = CredentialValidator::new(registry, Arc::new(PasswordHashVerifier));
    let issuer = TokenIssuer::new(jwt, Arc::clone(&keys))?;
    let verifier = TokenVerifier::new(keys);

    Ok(TokenService::new(
        validator,
        ScopePolicy,
        issuer,
        verifier,
    ))
}

/// Load keys and the client registry named by `config`
///
/// # Errors
///
/// Returns a configuration error if key material or the registry file is
/// missing or invalid
pub fn bootstrap(config: &ServerConfig) -> AppResult<TokenService> {
    let keys = SigningKeys::load(&config.jwt)?;
    let records = load_client_records(&config.clients_path)?;
    build_token_service(&config.jwt, keys, records)
}

/// HTTP router with token, token-info and health routes
pub fn router(service: Arc<TokenService>) -> Router {
    Router::new()
        .merge(OAuth2Routes::routes(service))
        .merge(HealthRoutes::routes())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl-C
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn serve(config: &ServerConfig, service: TokenService) -> AppResult<()> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await.map_err(|e| {
        AppError::config_invalid(format!("Cannot bind HTTP listener on {address}")).with_source(e)
    })?;

    info!("Token service listening on http://{address}");

    axum::serve(listener, router(Arc::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("HTTP server error: {e}")).with_source(e))?;

    info!("Token service stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down gracefully"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C, graceful shutdown disabled: {e}");
            std::future::pending::<()>().await;
        }
    }
}
