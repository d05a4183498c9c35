// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides a sample client registry, key files on disk and a wired TokenService
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `m2m_token_service`

pub use m2m_token_service::test_utils::*;

use m2m_token_service::{
    oauth2_server::{ClientRecord, TokenService},
    server::build_token_service,
};
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Write the shared key pair into `dir` and return (private, public) paths
pub fn write_key_files(dir: &Path) -> (PathBuf, PathBuf) {
    let pair = test_key_pair();
    let private_path = dir.join("private_key.pem");
    let public_path = dir.join("public_key.pem");
    std::fs::write(&private_path, &pair.private_pem).unwrap();
    std::fs::write(&public_path, &pair.public_pem).unwrap();
    (private_path, public_path)
}

/// Sample registry
///
/// - `acme-client` / `s3cr3t` in `acme.example`, scope `read`, no roles
/// - `admin-client` / `adm1n` in `acme.example`, scopes `read` and `write`, roles ADMIN then USER
/// - `acme-client` / `gl0bex` in `globex.example`, scope `write`, no roles
pub fn sample_records() -> Vec<ClientRecord> {
    vec![
        test_client_record("acme-client", "s3cr3t", "acme.example", &["read"], &[]),
        test_client_record(
            "admin-client",
            "adm1n",
            "acme.example",
            &["read", "write"],
            &["ADMIN", "USER"],
        ),
        test_client_record("acme-client", "gl0bex", "globex.example", &["write"], &[]),
    ]
}

/// Registry YAML holding only the `acme-client` / `acme.example` entry
pub fn sample_registry_yaml() -> String {
    format!(
        "clients:\n\
         \x20 - client_id: acme-client\n\
         \x20   client_secret: \"{}\"\n\
         \x20   allowed_scopes: [read]\n\
         \x20   identity_domain: acme.example\n",
        bcrypt::hash("s3cr3t", TEST_BCRYPT_COST).unwrap()
    )
}

/// Token service over [`sample_records`] and the shared key pair
pub fn token_service() -> TokenService {
    init_test_logging();
    build_token_service(&test_jwt_config(), test_signing_keys(), sample_records()).unwrap()
}
