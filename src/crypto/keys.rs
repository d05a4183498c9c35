// ABOUTME: RSA signing key material loaded once at startup from PEM files
// ABOUTME: Converts PKCS#8/SPKI PEM into jsonwebtoken keys and derives the x5t thumbprint
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! RS256 key material for token signing and verification
//!
//! The key pair is read and parsed exactly once while the server starts. The
//! resulting [`SigningKeys`] value is immutable and shared through `Arc` by the
//! issuer and the verifier, so no request ever touches the filesystem.

use crate::config::JwtConfig;
use crate::errors::{AppError, AppResult};
use base64::{engine::general_purpose, Engine};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::{
    pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    RsaPrivateKey, RsaPublicKey,
};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// Parsed RS256 key pair plus the `x5t` header value
#[derive(Clone)]
pub struct SigningKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    thumbprint: String,
}

impl SigningKeys {
    /// Load the key pair from the paths in `config`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either file is missing or unreadable,
    /// if a key cannot be parsed, or if the public key does not belong to the
    /// private key
    pub fn load(config: &JwtConfig) -> AppResult<Self> {
        let private_pem = read_key_file(&config.private_key_path, "JWT_PRIVATE_KEY_PATH")?;
        let public_pem = read_key_file(&config.public_key_path, "JWT_PUBLIC_KEY_PATH")?;

        let keys = Self::from_pem(&private_pem, &public_pem, config.x5t_thumbprint.clone())?;
        info!(
            private_key = %config.private_key_path.display(),
            public_key = %config.public_key_path.display(),
            x5t = %keys.thumbprint,
            "Loaded RS256 signing keys"
        );
        Ok(keys)
    }

    /// Build the key pair from PEM text
    ///
    /// `x5t` overrides the header thumbprint; when `None` the base64url
    /// SHA-256 digest of the public key DER is used.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either PEM is unparsable or the keys
    /// do not form a pair
    pub fn from_pem(private_pem: &str, public_pem: &str, x5t: Option<String>) -> AppResult<Self> {
        let private_der = pem_to_der(private_pem, "private")?;
        let public_der = pem_to_der(public_pem, "public")?;

        let private_key = RsaPrivateKey::from_pkcs8_der(&private_der).map_err(|e| {
            AppError::config_invalid(format!("Private key is not a PKCS#8 RSA key: {e}"))
        })?;
        let public_key = RsaPublicKey::from_public_key_der(&public_der).map_err(|e| {
            AppError::config_invalid(format!(
                "Public key is not an X.509 SubjectPublicKeyInfo RSA key: {e}"
            ))
        })?;

        if RsaPublicKey::from(&private_key) != public_key {
            return Err(AppError::config_invalid(
                "Public key does not match the private key",
            ));
        }

        let private_pkcs1 = private_key.to_pkcs1_der().map_err(|e| {
            AppError::config_invalid(format!("Failed to re-encode private key: {e}"))
        })?;
        let public_pkcs1 = public_key.to_pkcs1_der().map_err(|e| {
            AppError::config_invalid(format!("Failed to re-encode public key: {e}"))
        })?;

        let thumbprint = x5t.unwrap_or_else(|| public_key_thumbprint(&public_der));

        Ok(Self {
            encoding_key: EncodingKey::from_rsa_der(private_pkcs1.as_bytes()),
            decoding_key: DecodingKey::from_rsa_der(public_pkcs1.as_bytes()),
            thumbprint,
        })
    }

    /// Key used to sign issued tokens
    #[must_use]
    pub const fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Key used to verify presented tokens
    #[must_use]
    pub const fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Value of the `x5t` header
    #[must_use]
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }
}

impl fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeys")
            .field("thumbprint", &self.thumbprint)
            .finish_non_exhaustive()
    }
}

fn read_key_file(path: &Path, variable: &str) -> AppResult<String> {
    fs::read_to_string(path).map_err(|e| {
        AppError::config_missing(format!(
            "{variable} points to an unreadable file: {}",
            path.display()
        ))
        .with_source(e)
    })
}

/// Strip armor lines and whitespace, then base64-decode the PEM body
fn pem_to_der(pem: &str, kind: &str) -> AppResult<Vec<u8>> {
    let body: String = pem
        .lines()
        .filter(|line| !line.trim_start().starts_with("-----"))
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect();

    if body.is_empty() {
        return Err(AppError::config_invalid(format!(
            "The {kind} key PEM has no body"
        )));
    }

    general_purpose::STANDARD.decode(body).map_err(|e| {
        AppError::config_invalid(format!("The {kind} key PEM body is not valid base64"))
            .with_source(e)
    })
}

/// Base64url (unpadded) SHA-256 digest of the SubjectPublicKeyInfo DER
#[must_use]
pub fn public_key_thumbprint(public_der: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(Sha256::digest(public_der))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::test_utils::{other_key_pair, test_key_pair};

    #[test]
    fn test_from_pem_derives_thumbprint() {
        let pair = test_key_pair();
        let keys = SigningKeys::from_pem(&pair.private_pem, &pair.public_pem, None).unwrap();
        // SHA-256 is 32 bytes; unpadded base64url of 32 bytes is 43 chars
        assert_eq!(keys.thumbprint().len(), 43);
        assert_eq!(
            keys.thumbprint(),
            SigningKeys::from_pem(&pair.private_pem, &pair.public_pem, None)
                .unwrap()
                .thumbprint()
        );
    }

    #[test]
    fn test_configured_thumbprint_wins() {
        let pair = test_key_pair();
        let keys =
            SigningKeys::from_pem(&pair.private_pem, &pair.public_pem, Some("cert-x5t".into()))
                .unwrap();
        assert_eq!(keys.thumbprint(), "cert-x5t");
    }

    #[test]
    fn test_mismatched_pair_rejected() {
        let pair = test_key_pair();
        let other = other_key_pair();
        let error = SigningKeys::from_pem(&pair.private_pem, &other.public_pem, None).unwrap_err();
        assert_eq!(error.code, ErrorCode::ConfigInvalid);
    }

    #[test]
    fn test_pem_to_der_rejects_garbage() {
        assert!(pem_to_der("-----BEGIN X-----\n-----END X-----\n", "public").is_err());
        assert!(pem_to_der("-----BEGIN X-----\n!!!!\n-----END X-----\n", "public").is_err());
    }

    #[test]
    fn test_swapped_keys_rejected() {
        let pair = test_key_pair();
        assert!(SigningKeys::from_pem(&pair.public_pem, &pair.private_pem, None).is_err());
    }
}
