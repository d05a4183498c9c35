// ABOUTME: Client credential validation against the static registry
// ABOUTME: One-way secret hash comparison (bcrypt or Argon2) behind a SecretVerifier capability
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::models::ClientRecord;
use super::registry::ClientRegistry;
use crate::errors::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// One-way hash comparison capability
pub trait SecretVerifier: Send + Sync {
    /// Whether `plaintext` hashes to `hash`
    ///
    /// Unparsable hashes simply do not match.
    fn matches(&self, plaintext: &str, hash: &str) -> bool;
}

/// Supported secret hashing schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HashAlgorithm {
    /// bcrypt (`$2a$`, `$2b$`, `$2y$`)
    Bcrypt,
    /// Argon2id PHC string (`$argon2id$...`)
    Argon2,
}

/// [`SecretVerifier`] that dispatches on the hash prefix
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHashVerifier;

impl PasswordHashVerifier {
    fn detect(hash: &str) -> Option<HashAlgorithm> {
        if hash.starts_with("$argon2") {
            Some(HashAlgorithm::Argon2)
        } else if hash.starts_with("$2") {
            Some(HashAlgorithm::Bcrypt)
        } else {
            None
        }
    }
}

impl SecretVerifier for PasswordHashVerifier {
    fn matches(&self, plaintext: &str, hash: &str) -> bool {
        match Self::detect(hash) {
            Some(HashAlgorithm::Bcrypt) => bcrypt::verify(plaintext, hash).unwrap_or(false),
            Some(HashAlgorithm::Argon2) => PasswordHash::new(hash).is_ok_and(|parsed| {
                Argon2::default()
                    .verify_password(plaintext.as_bytes(), &parsed)
                    .is_ok()
            }),
            None => {
                warn!("Registry entry carries a hash in an unrecognized format");
                false
            }
        }
    }
}

/// Hash a client secret for the registry file
///
/// `cost` only applies to bcrypt; Argon2 uses the crate's default parameters.
///
/// # Errors
///
/// Returns an error if the cost is out of range or hashing fails
pub fn hash_client_secret(secret: &str, algorithm: HashAlgorithm, cost: u32) -> AppResult<String> {
    match algorithm {
        HashAlgorithm::Bcrypt => bcrypt::hash(secret, cost).map_err(|e| {
            AppError::invalid_input(format!("bcrypt hashing failed: {e}")).with_source(e)
        }),
        HashAlgorithm::Argon2 => {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(secret.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AppError::internal(format!("Argon2 hashing failed: {e}")))
        }
    }
}

/// Checks presented client credentials against the registry
///
/// Failures are never distinguished to the caller: an unknown client, a wrong
/// domain and a wrong secret all produce `None`.
#[derive(Clone)]
pub struct CredentialValidator {
    registry: Arc<ClientRegistry>,
    verifier: Arc<dyn SecretVerifier>,
}

impl CredentialValidator {
    /// Create a validator over `registry` using `verifier` for hash comparison
    #[must_use]
    pub fn new(registry: Arc<ClientRegistry>, verifier: Arc<dyn SecretVerifier>) -> Self {
        Self { registry, verifier }
    }

    /// Return the record matching all of `client_id`, `domain` and `client_secret`
    #[must_use]
    pub fn validate(
        &self,
        client_id: &str,
        client_secret: &str,
        domain: &str,
    ) -> Option<&ClientRecord> {
        let mut compared = false;
        let record = self
            .registry
            .candidates(client_id)
            .iter()
            .filter(|record| record.identity_domain == domain)
            .find(|record| {
                compared = true;
                self.verifier.matches(client_secret, &record.secret_hash)
            });

        // Unknown client or domain: spend the same hash work as a wrong secret
        if !compared {
            if let Some(hash) = self.registry.timing_reference() {
                let _ = self.verifier.matches(client_secret, hash);
            }
        }

        if record.is_some() {
            debug!(client_id = %client_id, domain = %domain, "Client credentials accepted");
        } else {
            warn!(client_id = %client_id, domain = %domain, "Client credentials rejected");
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_client_record, TEST_BCRYPT_COST};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct PlainVerifier;

    #[derive(Default)]
    struct CountingVerifier {
        calls: AtomicUsize,
    }

    impl SecretVerifier for CountingVerifier {
        fn matches(&self, plaintext: &str, hash: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            plaintext == hash
        }
    }

    impl SecretVerifier for PlainVerifier {
        fn matches(&self, plaintext: &str, hash: &str) -> bool {
            plaintext == hash
        }
    }

    #[test]
    fn test_bcrypt_and_argon2_hashes_verify() {
        let verifier = PasswordHashVerifier;

        let bcrypt_hash =
            hash_client_secret("s3cr3t", HashAlgorithm::Bcrypt, TEST_BCRYPT_COST).unwrap();
        assert!(verifier.matches("s3cr3t", &bcrypt_hash));
        assert!(!verifier.matches("S3CR3T", &bcrypt_hash));

        let argon2_hash = hash_client_secret("s3cr3t", HashAlgorithm::Argon2, 0).unwrap();
        assert!(argon2_hash.starts_with("$argon2"));
        assert!(verifier.matches("s3cr3t", &argon2_hash));
        assert!(!verifier.matches("wrong", &argon2_hash));
    }

    #[test]
    fn test_unrecognized_hash_never_matches() {
        assert!(!PasswordHashVerifier.matches("s3cr3t", "s3cr3t"));
        assert!(!PasswordHashVerifier.matches("s3cr3t", "$argon2id$garbage"));
    }

    #[test]
    fn test_invalid_bcrypt_cost_rejected() {
        assert!(hash_client_secret("s3cr3t", HashAlgorithm::Bcrypt, 1).is_err());
    }

    #[test]
    fn test_validator_picks_record_by_domain() {
        let records = vec![
            ClientRecord {
                client_id: "svc".into(),
                secret_hash: "alpha".into(),
                allowed_scopes: std::iter::once("read".to_owned()).collect(),
                identity_domain: "a.example".into(),
                roles: Vec::new(),
            },
            ClientRecord {
                client_id: "svc".into(),
                secret_hash: "beta".into(),
                allowed_scopes: std::iter::once("write".to_owned()).collect(),
                identity_domain: "b.example".into(),
                roles: Vec::new(),
            },
        ];
        let validator =
            CredentialValidator::new(Arc::new(ClientRegistry::new(records)), Arc::new(PlainVerifier));

        let record = validator.validate("svc", "beta", "b.example").unwrap();
        assert!(record.allowed_scopes.contains("write"));
        assert!(validator.validate("svc", "alpha", "b.example").is_none());
        assert!(validator.validate("svc", "beta", "B.EXAMPLE").is_none());
        assert!(validator.validate("nobody", "beta", "b.example").is_none());
    }

    #[test]
    fn test_validator_with_bcrypt_registry() {
        let registry = ClientRegistry::new(vec![test_client_record(
            "acme-client",
            "s3cr3t",
            "acme.example",
            &["read"],
            &[],
        )]);
        let validator =
            CredentialValidator::new(Arc::new(registry), Arc::new(PasswordHashVerifier));
        assert!(validator
            .validate("acme-client", "s3cr3t", "acme.example")
            .is_some());
        assert!(validator
            .validate("acme-client", "wrong", "acme.example")
            .is_none());
    }

    #[test]
    fn test_every_rejection_performs_one_hash_comparison() {
        let registry = ClientRegistry::new(vec![ClientRecord {
            client_id: "svc".into(),
            secret_hash: "alpha".into(),
            allowed_scopes: std::iter::once("read".to_owned()).collect(),
            identity_domain: "a.example".into(),
            roles: Vec::new(),
        }]);
        let verifier = Arc::new(CountingVerifier::default());
        let validator = CredentialValidator::new(Arc::new(registry), verifier.clone());

        for (client_id, secret, domain) in [
            ("svc", "wrong", "a.example"),
            ("svc", "alpha", "b.example"),
            ("nobody", "alpha", "a.example"),
        ] {
            let before = verifier.calls.load(Ordering::SeqCst);
            // "alpha" matches the reference hash but never authenticates outside its domain
            assert!(validator.validate(client_id, secret, domain).is_none());
            assert_eq!(
                verifier.calls.load(Ordering::SeqCst) - before,
                1,
                "{client_id}/{domain}"
            );
        }
    }
}
