// ABOUTME: Configuration module for the token service
// ABOUTME: Environment-driven server/JWT settings and the static client registry file
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Configuration module
//!
//! - **Environment**: bind address, issuer, audience, token lifetime and key paths
//! - **Clients**: the YAML client registry loaded once at startup

/// Client registry file loading
pub mod clients;
/// Environment and server configuration
pub mod environment;

pub use clients::load_client_records;
pub use environment::{JwtConfig, ServerConfig};
