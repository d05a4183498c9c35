// ABOUTME: Token issuance and introspection orchestration for the client-credentials flow
// ABOUTME: Sequences grant, domain, credential and scope checks before issuing or decoding tokens
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::credentials::CredentialValidator;
use super::issuer::TokenIssuer;
use super::models::{
    IntrospectRequest, IssueTokenRequest, OAuth2Error, TokenInfoResponse, TokenResponse,
};
use super::scope::ScopePolicy;
use super::verifier::{TokenError, TokenVerifier};
use crate::constants::oauth2::{
    DEFAULT_ROLE, GRANT_TYPE_CLIENT_CREDENTIALS, ROLE_SEPARATOR, TOKEN_TYPE_BEARER,
};
use crate::errors::AppError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

/// Request-level failure of an issuance or introspection call
#[derive(Debug, Error)]
pub enum TokenServiceError {
    /// The grant type is not `CLIENT_CREDENTIALS`
    #[error("unsupported grant type")]
    UnsupportedGrantType,
    /// A required field is missing or the scope is not permitted
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Client authentication failed
    #[error("client authentication failed")]
    InvalidClient,
    /// The presented token did not verify
    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),
    /// Signing or key failure; not caused by the request
    #[error(transparent)]
    Server(#[from] AppError),
}

impl TokenServiceError {
    /// OAuth 2.0 error body for this failure
    #[must_use]
    pub fn to_oauth2_error(&self) -> OAuth2Error {
        match self {
            Self::UnsupportedGrantType => OAuth2Error::unsupported_grant_type(),
            Self::InvalidRequest(description) => OAuth2Error::invalid_request(description),
            Self::InvalidClient => OAuth2Error::invalid_client(),
            Self::InvalidToken(_) => OAuth2Error::invalid_token(),
            Self::Server(_) => OAuth2Error {
                error: "server_error".to_owned(),
                error_description: Some("The token service is unavailable".to_owned()),
            },
        }
    }

    /// HTTP status for this failure
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedGrantType | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidClient | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TokenServiceError {
    fn into_response(self) -> Response {
        if let Self::Server(ref error) = self {
            tracing::error!(
                error.code = ?error.code,
                error.message = %error.message,
                "Token service failure"
            );
        }
        (self.status_code(), Json(self.to_oauth2_error())).into_response()
    }
}

/// Client-credentials token service
///
/// Stateless apart from the immutable registry and keys it was built with, so
/// one instance is shared by every request.
#[derive(Clone)]
pub struct TokenService {
    validator: CredentialValidator,
    scope_policy: ScopePolicy,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl TokenService {
    /// Assemble the service from its stages
    #[must_use]
    pub const fn new(
        validator: CredentialValidator,
        scope_policy: ScopePolicy,
        issuer: TokenIssuer,
        verifier: TokenVerifier,
    ) -> Self {
        Self {
            validator,
            scope_policy,
            issuer,
            verifier,
        }
    }

    /// Handle a token request
    ///
    /// Required form fields are checked first. The remaining stages run in a
    /// fixed order and the first failure wins: grant type, identity domain,
    /// credentials, registry lookup, scope, then issuance.
    ///
    /// # Errors
    ///
    /// Returns the [`TokenServiceError`] of the first failing stage
    pub fn issue(
        &self,
        request: IssueTokenRequest,
        now: DateTime<Utc>,
    ) -> Result<TokenResponse, TokenServiceError> {
        let grant_type = required(request.grant_type.as_deref(), "grant_type")?;
        let scope = required(request.scope.as_deref(), "scope")?;

        if grant_type != GRANT_TYPE_CLIENT_CREDENTIALS {
            warn!(grant_type = %grant_type, "Rejected unsupported grant type");
            return Err(TokenServiceError::UnsupportedGrantType);
        }

        let domain = required(
            request.identity_domain.as_deref(),
            "X-OAUTH-IDENTITY-DOMAIN-NAME header",
        )?;

        let Some(credentials) = request.credentials else {
            warn!(domain = %domain, "Token request without usable Basic credentials");
            return Err(TokenServiceError::InvalidClient);
        };

        let record = self
            .validator
            .validate(&credentials.client_id, &credentials.client_secret, domain)
            .ok_or(TokenServiceError::InvalidClient)?;

        if !self.scope_policy.is_allowed(record, scope) {
            warn!(
                client_id = %record.client_id,
                scope = %scope,
                "Requested scope is not allowed for client"
            );
            return Err(TokenServiceError::InvalidRequest(format!(
                "Scope '{scope}' is not allowed for this client"
            )));
        }

        let roles = if record.roles.is_empty() {
            vec![DEFAULT_ROLE.to_owned()]
        } else {
            record.roles.clone()
        };

        let token = self
            .issuer
            .issue(&record.client_id, scope, domain, &roles, now)?;

        Ok(TokenResponse {
            access_token: token.token,
            token_type: TOKEN_TYPE_BEARER.to_owned(),
            expires_in: self.issuer.ttl().num_seconds().unsigned_abs(),
            scope: scope.to_owned(),
        })
    }

    /// Handle a token introspection request
    ///
    /// # Errors
    ///
    /// Returns [`TokenServiceError::InvalidRequest`] when no token is supplied
    /// and [`TokenServiceError::InvalidToken`] for any verification failure
    pub fn introspect(
        &self,
        request: &IntrospectRequest,
        now: DateTime<Utc>,
    ) -> Result<TokenInfoResponse, TokenServiceError> {
        let token = required(request.access_token.as_deref(), "access_token")?;
        debug!(
            domain = request.identity_domain.as_deref().unwrap_or("-"),
            "Introspecting access token"
        );

        let claims = self.verifier.verify(token, now)?;

        let user_role = if claims.roles.is_empty() {
            None
        } else {
            Some(claims.roles.join(ROLE_SEPARATOR))
        };

        Ok(TokenInfoResponse {
            issuer: claims.issuer,
            audience: claims.audience,
            expiration: claims.expires_at.timestamp(),
            jwt_id: claims.jwt_id,
            issued_at: claims.issued_at.timestamp(),
            subject: claims.subject,
            client: claims.client,
            scope: claims.scope,
            domain: claims.domain,
            version: claims.version,
            user_role,
        })
    }
}

/// A present, non-blank field value or `invalid_request`
///
/// The value itself is returned untrimmed; literals are compared exactly.
fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, TokenServiceError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| TokenServiceError::InvalidRequest(format!("Missing required {name}")))
}
