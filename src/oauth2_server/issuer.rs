// ABOUTME: RS256 access token issuance for validated client-credentials requests
// ABOUTME: Builds the fixed claim set, generates a random jti and signs with the cached private key
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::claims::{IssuedTokenClaims, JwtClaims};
use crate::config::JwtConfig;
use crate::constants::oauth2::{JWT_ID_BYTES, KEY_ID_PREFIX};
use crate::crypto::SigningKeys;
use crate::errors::{AppError, AppResult};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{encode, Algorithm, Header};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use tracing::{error, info};

/// A signed token together with the claims and header values it carries
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Compact JWS serialization
    pub token: String,
    /// Claims embedded in the token
    pub claims: IssuedTokenClaims,
    /// `kid` header
    pub key_id: String,
    /// `x5t` header
    pub thumbprint: String,
}

/// Signs access tokens with the service's private key
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<SigningKeys>,
    rng: SystemRandom,
    issuer: String,
    audience: Vec<String>,
    version: String,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from JWT settings and loaded keys
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configured lifetime is not a
    /// positive duration
    pub fn new(config: &JwtConfig, keys: Arc<SigningKeys>) -> AppResult<Self> {
        Ok(Self {
            keys,
            rng: SystemRandom::new(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            version: config.version.clone(),
            ttl: config.token_ttl()?,
        })
    }

    /// Token lifetime
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for an already validated client
    ///
    /// `now` is truncated to whole seconds so the returned claims equal what a
    /// verifier decodes from the token. `roles` is embedded as given; callers
    /// apply the default role beforehand.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the system RNG fails, if the expiry is not
    /// representable, or if signing fails. None is recoverable per request.
    pub fn issue(
        &self,
        client_id: &str,
        scope: &str,
        domain: &str,
        roles: &[String],
        now: DateTime<Utc>,
    ) -> AppResult<AccessToken> {
        let issued_at = now.trunc_subsecs(0);
        let expires_at = issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
            error!(ttl = self.ttl.num_seconds(), "Token expiry overflows the time range");
            AppError::internal(format!(
                "Token expiry {issued_at} + {}s is not representable",
                self.ttl.num_seconds()
            ))
        })?;
        let claims = IssuedTokenClaims {
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            subject: client_id.to_owned(),
            client: Some(client_id.to_owned()),
            scope: vec![scope.to_owned()],
            domain: Some(domain.to_owned()),
            roles: roles.to_vec(),
            version: Some(self.version.clone()),
            jwt_id: self.generate_jwt_id()?,
            issued_at,
            expires_at,
        };

        let key_id = format!("{KEY_ID_PREFIX}{domain}");
        let thumbprint = self.keys.thumbprint().to_owned();

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(key_id.clone());
        header.x5t = Some(thumbprint.clone());

        let token = encode(&header, &JwtClaims::from(&claims), self.keys.encoding_key())
            .map_err(|e| {
                error!(client_id = %client_id, "Failed to sign access token: {e}");
                AppError::internal(format!("Failed to sign RS256 access token: {e}"))
            })?;

        info!(
            client_id = %client_id,
            domain = %domain,
            scope = %scope,
            jti = %claims.jwt_id,
            exp = claims.expires_at.timestamp(),
            "Issued access token"
        );

        Ok(AccessToken {
            token,
            claims,
            key_id,
            thumbprint,
        })
    }

    /// 128 random bits, base64url without padding
    fn generate_jwt_id(&self) -> AppResult<String> {
        let mut bytes = [0u8; JWT_ID_BYTES];
        self.rng.fill(&mut bytes).map_err(|e| {
            error!("CRITICAL: SystemRandom failed - cannot generate jti: {e}");
            AppError::internal("System RNG failure - cannot generate token identifier")
        })?;
        Ok(general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }
}
