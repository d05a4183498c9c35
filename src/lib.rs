// ABOUTME: Main library entry point for the client-credentials token service
// ABOUTME: Issues and introspects RS256 access tokens for a static registry of M2M clients
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # M2M Token Service
//!
//! An OAuth 2.0 authorization server for machine-to-machine clients using the
//! client-credentials grant. Clients are registered statically in a YAML file;
//! tokens are RS256-signed JWTs that carry their own validity, so nothing is
//! persisted per token.
//!
//! ## Architecture
//!
//! - **Credential Validator**: checks `(client_id, secret, domain)` against the registry
//! - **Scope Policy**: exact-match allow-list per client
//! - **Token Issuer / Verifier**: sign and decode the fixed claim set
//! - **Token Service**: sequences the stages and maps failures to OAuth 2.0 errors
//! - **Routes**: axum handlers for `/oauth2/rest/token` and `/oauth2/rest/token/info`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use m2m_token_service::config::ServerConfig;
//! use m2m_token_service::errors::AppResult;
//! use m2m_token_service::server::{bootstrap, serve};
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let service = bootstrap(&config)?;
//!     serve(&config, service).await
//! }
//! ```

/// Environment and client registry configuration
pub mod config;

/// Application constants and environment accessors
pub mod constants;

/// RSA key material for token signing
pub mod crypto;

/// Unified error handling for startup and configuration failures
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Client-credentials token issuance and introspection
pub mod oauth2_server;

/// Operational HTTP routes
pub mod routes;

/// Router assembly and HTTP serving
pub mod server;

/// Shared helpers for unit and integration tests
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;
