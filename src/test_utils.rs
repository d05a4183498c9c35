// ABOUTME: Test utilities for creating key material and client records in a consistent way
// ABOUTME: Centralizes slow RSA key generation so each test binary pays for it once
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::expect_used)]

use crate::config::JwtConfig;
use crate::crypto::SigningKeys;
use crate::oauth2_server::models::ClientRecord;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Lowest bcrypt cost accepted by the `bcrypt` crate; keeps tests fast
pub const TEST_BCRYPT_COST: u32 = 4;

/// `iss` used by [`test_jwt_config`]
pub const TEST_ISSUER: &str = "http://localhost:8080/oauth2";

/// Single `aud` entry used by [`test_jwt_config`]
pub const TEST_AUDIENCE: &str = "m2m-token-service";

/// Token lifetime used by [`test_jwt_config`]
pub const TEST_TTL_SECONDS: u64 = 3600;

/// PEM-encoded RSA key pair
#[derive(Debug, Clone)]
pub struct TestKeyPair {
    /// PKCS#8 private key
    pub private_pem: String,
    /// SubjectPublicKeyInfo public key
    pub public_pem: String,
}

static PRIMARY: OnceLock<TestKeyPair> = OnceLock::new();
static SECONDARY: OnceLock<TestKeyPair> = OnceLock::new();

fn generate_key_pair() -> TestKeyPair {
    let private_key =
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("RSA key generation failed");
    let public_key = RsaPublicKey::from(&private_key);

    TestKeyPair {
        private_pem: private_key
            .to_pkcs8_pem(LineEnding::LF)
            .expect("private key PEM encoding failed")
            .to_string(),
        public_pem: public_key
            .to_public_key_pem(LineEnding::LF)
            .expect("public key PEM encoding failed"),
    }
}

/// Shared RSA-2048 key pair, generated on first use
#[must_use]
pub fn test_key_pair() -> &'static TestKeyPair {
    PRIMARY.get_or_init(generate_key_pair)
}

/// A second, unrelated key pair for mismatch and foreign-signature tests
#[must_use]
pub fn other_key_pair() -> &'static TestKeyPair {
    SECONDARY.get_or_init(generate_key_pair)
}

/// Signing keys built from [`test_key_pair`]
#[must_use]
pub fn test_signing_keys() -> SigningKeys {
    let pair = test_key_pair();
    SigningKeys::from_pem(&pair.private_pem, &pair.public_pem, None)
        .expect("test key pair must load")
}

/// Signing keys built from [`other_key_pair`]
#[must_use]
pub fn other_signing_keys() -> SigningKeys {
    let pair = other_key_pair();
    SigningKeys::from_pem(&pair.private_pem, &pair.public_pem, None)
        .expect("second test key pair must load")
}

/// JWT settings with a one hour lifetime and placeholder key paths
#[must_use]
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        issuer: TEST_ISSUER.to_owned(),
        audience: vec![TEST_AUDIENCE.to_owned()],
        expiration_seconds: TEST_TTL_SECONDS,
        private_key_path: PathBuf::from("keys/private_key.pem"),
        public_key_path: PathBuf::from("keys/public_key.pem"),
        version: "1.0".into(),
        x5t_thumbprint: None,
    }
}

/// Build a registry record whose secret is hashed with a cheap bcrypt cost
#[must_use]
pub fn test_client_record(
    client_id: &str,
    secret: &str,
    identity_domain: &str,
    scopes: &[&str],
    roles: &[&str],
) -> ClientRecord {
    ClientRecord {
        client_id: client_id.to_owned(),
        secret_hash: bcrypt::hash(secret, TEST_BCRYPT_COST).expect("bcrypt hashing failed"),
        allowed_scopes: scopes.iter().map(|s| (*s).to_owned()).collect(),
        identity_domain: identity_domain.to_owned(),
        roles: roles.iter().map(|r| (*r).to_owned()).collect(),
    }
}
