// ABOUTME: OAuth 2.0 HTTP route handlers for the axum web framework
// ABOUTME: Maps the token and token-info endpoints onto the transport-independent TokenService
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Token endpoints
//!
//! The handlers only translate HTTP into [`IssueTokenRequest`] /
//! [`IntrospectRequest`] values. Every decision is made by [`TokenService`].

use super::endpoints::{TokenService, TokenServiceError};
use super::models::{ClientCredentials, IntrospectRequest, IssueTokenRequest};
use crate::constants::headers::{BASIC_AUTH_PREFIX, IDENTITY_DOMAIN};
use crate::constants::paths;
use crate::errors::AppError;
use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Form body of a token request
#[derive(Debug, Default, Deserialize)]
pub struct TokenForm {
    /// Requested grant type
    pub grant_type: Option<String>,
    /// Requested scope
    pub scope: Option<String>,
}

/// Query string of a token-info request
#[derive(Debug, Default, Deserialize)]
pub struct TokenInfoQuery {
    /// Token to introspect
    pub access_token: Option<String>,
}

/// OAuth 2.0 token routes
pub struct OAuth2Routes;

impl OAuth2Routes {
    /// Create the token issuance and introspection routes
    pub fn routes(service: Arc<TokenService>) -> Router {
        Router::new()
            .route(paths::TOKEN, post(Self::handle_token))
            .route(paths::TOKEN_INFO, get(Self::handle_token_info))
            .with_state(service)
    }

    /// Handle token issuance (POST /oauth2/rest/token)
    async fn handle_token(
        State(service): State<Arc<TokenService>>,
        headers: HeaderMap,
        form: Result<Form<TokenForm>, FormRejection>,
    ) -> Result<Response, TokenServiceError> {
        let Form(form) = form.map_err(|rejection| {
            warn!("Rejected token request body: {rejection}");
            TokenServiceError::InvalidRequest(format!("Invalid token request body: {rejection}"))
        })?;
        let request = IssueTokenRequest {
            identity_domain: identity_domain(&headers),
            credentials: basic_credentials(&headers),
            grant_type: form.grant_type,
            scope: form.scope,
        };
        info!(
            domain = request.identity_domain.as_deref().unwrap_or("-"),
            grant_type = request.grant_type.as_deref().unwrap_or("-"),
            "Received token request"
        );

        // Secret hashing is CPU bound; keep it off the async workers
        let response = tokio::task::spawn_blocking(move || service.issue(request, Utc::now()))
            .await
            .map_err(|e| AppError::internal(format!("Token issuance task failed: {e}")))??;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle token introspection (GET /oauth2/rest/token/info)
    async fn handle_token_info(
        State(service): State<Arc<TokenService>>,
        headers: HeaderMap,
        Query(query): Query<TokenInfoQuery>,
    ) -> Result<Response, TokenServiceError> {
        let request = IntrospectRequest {
            access_token: query.access_token,
            identity_domain: identity_domain(&headers),
        };
        info!(
            domain = request.identity_domain.as_deref().unwrap_or("-"),
            "Received token info request"
        );

        let response = service.introspect(&request, Utc::now())?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}

fn identity_domain(headers: &HeaderMap) -> Option<String> {
    headers
        .get(IDENTITY_DOMAIN)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

/// Decode `Authorization: Basic base64(client_id:client_secret)`
///
/// Returns `None` when the header is absent, uses another scheme, is not valid
/// base64/UTF-8, or has no `:` separator. The secret may itself contain `:`.
#[must_use]
pub fn basic_credentials(headers: &HeaderMap) -> Option<ClientCredentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix(BASIC_AUTH_PREFIX)?.trim();

    let decoded = match general_purpose::STANDARD.decode(encoded) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to decode Basic authorization header: {e}");
            return None;
        }
    };
    let decoded = String::from_utf8(decoded).ok()?;
    let (client_id, client_secret) = decoded.split_once(':')?;

    Some(ClientCredentials::new(client_id, client_secret))
}

/// Build an `Authorization` header value for the given credentials
#[must_use]
pub fn basic_authorization_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "{}{}",
        BASIC_AUTH_PREFIX,
        general_purpose::STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    fn headers_with_authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_basic_credentials_round_trip() {
        let headers =
            headers_with_authorization(&basic_authorization_header("acme-client", "s3:cr3t"));
        let credentials = basic_credentials(&headers).unwrap();
        assert_eq!(credentials.client_id, "acme-client");
        assert_eq!(credentials.client_secret, "s3:cr3t");
    }

    #[test]
    fn test_basic_credentials_rejects_bad_headers() {
        assert!(basic_credentials(&HeaderMap::new()).is_none());
        assert!(basic_credentials(&headers_with_authorization("Bearer abc")).is_none());
        assert!(basic_credentials(&headers_with_authorization("Basic !!!")).is_none());
        // "no-separator" without a colon
        assert!(basic_credentials(&headers_with_authorization("Basic bm8tc2VwYXJhdG9y")).is_none());
    }

    #[test]
    fn test_identity_domain_header_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"X-OAUTH-IDENTITY-DOMAIN-NAME").unwrap(),
            HeaderValue::from_static("acme.example"),
        );
        assert_eq!(identity_domain(&headers).as_deref(), Some("acme.example"));
    }
}
