// ABOUTME: RS256 access token verification with a classified error taxonomy
// ABOUTME: Separates malformed input, bad signatures, expiry and unexpected failures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::claims::{IssuedTokenClaims, JwtClaims};
use crate::crypto::SigningKeys;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a presented token was rejected
///
/// All variants collapse to a single `invalid_token` response at the HTTP
/// boundary; the distinction exists for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature is valid but the token is past its expiry
    #[error("token expired at {expired_at}")]
    Expired {
        /// The token's `exp` instant
        expired_at: DateTime<Utc>,
    },
    /// Signature does not verify against the service key
    #[error("token signature verification failed")]
    BadSignature,
    /// Token structure cannot be parsed
    #[error("token is malformed: {details}")]
    Malformed {
        /// What could not be parsed
        details: String,
    },
    /// Any other verification failure
    #[error("token validation failed: {reason}")]
    Unknown {
        /// Underlying cause
        reason: String,
    },
}

impl TokenError {
    /// Short machine-readable kind for structured logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Expired { .. } => "expired",
            Self::BadSignature => "bad_signature",
            Self::Malformed { .. } => "malformed",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// Verifies tokens signed by [`super::issuer::TokenIssuer`]
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<SigningKeys>,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier using the public half of `keys`
    #[must_use]
    pub fn new(keys: Arc<SigningKeys>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        // Expiry is checked against the caller's clock below
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self { keys, validation }
    }

    /// Verify `token` and decode its claims
    ///
    /// The token is valid while `now < expires_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] for structurally broken input,
    /// [`TokenError::BadSignature`] when the signature does not verify,
    /// [`TokenError::Expired`] once `now >= expires_at`, and
    /// [`TokenError::Unknown`] for anything else
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<IssuedTokenClaims, TokenError> {
        let result = self.verify_inner(token, now);
        if let Err(ref error) = result {
            warn!(error.kind = error.kind(), reason = %error, "Access token rejected");
        }
        result
    }

    fn verify_inner(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedTokenClaims, TokenError> {
        check_structure(token)?;

        let data = decode::<JwtClaims>(token, self.keys.decoding_key(), &self.validation)
            .map_err(|e| classify(&e))?;
        let claims = IssuedTokenClaims::try_from(data.claims)?;

        if now >= claims.expires_at {
            return Err(TokenError::Expired {
                expired_at: claims.expires_at,
            });
        }

        debug!(
            sub = %claims.subject,
            jti = %claims.jwt_id,
            "Access token verified"
        );
        Ok(claims)
    }
}

/// Reject input that is not three segments with a decodable header and a JSON object payload
fn check_structure(token: &str) -> Result<(), TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, signature] = segments.as_slice() else {
        return Err(TokenError::Malformed {
            details: format!("expected 3 segments, found {}", segments.len()),
        });
    };
    if signature.is_empty() {
        return Err(TokenError::Malformed {
            details: "signature segment is empty".into(),
        });
    }

    decode_header(token).map_err(|e| TokenError::Malformed {
        details: format!("invalid header: {e}"),
    })?;

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::Malformed {
            details: format!("payload is not base64url: {e}"),
        })?;
    serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&payload).map_err(
        |e| TokenError::Malformed {
            details: format!("payload is not a JSON object: {e}"),
        },
    )?;

    Ok(())
}

/// Map a `jsonwebtoken` failure onto [`TokenError`]
///
/// Header and payload were already checked, so base64 failures here come from
/// the signature segment.
fn classify(error: &jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::Base64(_) => {
            TokenError::BadSignature
        }
        ErrorKind::InvalidToken
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed {
            details: error.to_string(),
        },
        _ => TokenError::Unknown {
            reason: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_checks() {
        assert!(matches!(
            check_structure("only.two"),
            Err(TokenError::Malformed { .. })
        ));
        assert!(matches!(
            check_structure("a.b.c.d"),
            Err(TokenError::Malformed { .. })
        ));
        assert!(matches!(
            check_structure("not-base64!.e30.sig"),
            Err(TokenError::Malformed { .. })
        ));
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        // {"alg":"RS256","typ":"JWT"} . [1,2] . sig
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = general_purpose::URL_SAFE_NO_PAD.encode("[1,2]");
        let token = format!("{header}.{payload}.c2ln");
        assert!(matches!(
            check_structure(&token),
            Err(TokenError::Malformed { .. })
        ));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(TokenError::BadSignature.kind(), "bad_signature");
        assert_eq!(
            TokenError::Unknown {
                reason: "x".into()
            }
            .kind(),
            "unknown"
        );
    }
}
