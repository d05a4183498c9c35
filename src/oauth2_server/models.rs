// ABOUTME: OAuth 2.0 data models for the client-credentials token service
// ABOUTME: Client records, issuance/introspection requests and RFC 6749 response structures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A statically registered OAuth 2.0 client
///
/// Loaded once at startup from the registry file and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientRecord {
    /// Client identifier presented in the Basic credentials
    pub client_id: String,
    /// One-way hash of the client secret (bcrypt or argon2 PHC string)
    #[serde(rename = "client_secret")]
    pub secret_hash: String,
    /// Scopes this client may request, matched literally
    #[serde(default)]
    pub allowed_scopes: HashSet<String>,
    /// Identity domain the client belongs to
    pub identity_domain: String,
    /// Roles embedded into issued tokens, in order
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Client credentials extracted from an HTTP Basic authorization header
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Client identifier
    pub client_id: String,
    /// Plaintext client secret
    pub client_secret: String,
}

impl ClientCredentials {
    /// Creates a new credential pair
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Transport-independent token issuance request
#[derive(Debug, Clone, Default)]
pub struct IssueTokenRequest {
    /// Identity domain supplied by the caller
    pub identity_domain: Option<String>,
    /// Client credentials, `None` when absent or undecodable
    pub credentials: Option<ClientCredentials>,
    /// Requested grant type
    pub grant_type: Option<String>,
    /// Requested scope (a single atomic string)
    pub scope: Option<String>,
}

/// Transport-independent token introspection request
#[derive(Debug, Clone, Default)]
pub struct IntrospectRequest {
    /// The access token to decode
    pub access_token: Option<String>,
    /// Identity domain supplied by the caller (informational only)
    pub identity_domain: Option<String>,
}

/// OAuth 2.0 Token Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token (JWT)
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Lifetime of the token in seconds
    pub expires_in: u64,
    /// Scope granted
    pub scope: String,
}

/// Decoded claims of a presented access token
///
/// Timestamps are seconds since the Unix epoch. `userRole` folds the roles
/// claim into a single colon-joined string and is omitted when the token
/// carries no roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfoResponse {
    /// Issuer
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Audience list
    #[serde(rename = "aud")]
    pub audience: Vec<String>,
    /// Expiration time
    #[serde(rename = "exp")]
    pub expiration: i64,
    /// Token identifier
    #[serde(rename = "jti")]
    pub jwt_id: String,
    /// Issued-at time
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Subject (client identifier)
    #[serde(rename = "sub")]
    pub subject: String,
    /// Client identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Granted scopes
    pub scope: Vec<String>,
    /// Identity domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Claim-set version
    #[serde(rename = "v", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Roles joined with `:` (e.g. `ADMIN:USER`)
    #[serde(rename = "userRole", skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
}

/// OAuth 2.0 Error Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Error {
    /// Error code
    pub error: String,
    /// Human-readable error description
    pub error_description: Option<String>,
}

impl OAuth2Error {
    /// Create an `invalid_request` error
    #[must_use]
    pub fn invalid_request(description: &str) -> Self {
        Self {
            error: "invalid_request".to_owned(),
            error_description: Some(description.to_owned()),
        }
    }

    /// Create an `invalid_client` error
    #[must_use]
    pub fn invalid_client() -> Self {
        Self {
            error: "invalid_client".to_owned(),
            error_description: Some("Client authentication failed".to_owned()),
        }
    }

    /// Create an `unsupported_grant_type` error
    #[must_use]
    pub fn unsupported_grant_type() -> Self {
        Self {
            error: "unsupported_grant_type".to_owned(),
            error_description: Some("Only CLIENT_CREDENTIALS grant type is supported".to_owned()),
        }
    }

    /// Create an `invalid_token` error
    ///
    /// The description is deliberately generic: callers never learn which
    /// verification step rejected the token.
    #[must_use]
    pub fn invalid_token() -> Self {
        Self {
            error: "invalid_token".to_owned(),
            error_description: Some("The access token is invalid or has expired".to_owned()),
        }
    }
}
