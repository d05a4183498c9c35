// ABOUTME: Typed claim set carried by issued access tokens and its JWT wire mapping
// ABOUTME: Converts between IssuedTokenClaims and the serialized iss/aud/exp/jti/... payload
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::verifier::TokenError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims embedded in every issued access token
///
/// `client`, `domain` and `version` are always present on tokens this service
/// issues. They are optional here because a presented token that lacks them is
/// still decodable; missing optional claims surface as `None` or an empty list
/// rather than a fabricated default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokenClaims {
    /// `iss`
    pub issuer: String,
    /// `aud`, in configured order
    pub audience: Vec<String>,
    /// `sub` (the client identifier)
    pub subject: String,
    /// `client` (the client identifier)
    pub client: Option<String>,
    /// `scope`; a single element for tokens issued here
    pub scope: Vec<String>,
    /// `domain`
    pub domain: Option<String>,
    /// `roles`, in registry order
    pub roles: Vec<String>,
    /// `v`
    pub version: Option<String>,
    /// `jti`
    pub jwt_id: String,
    /// `iat`, whole seconds
    pub issued_at: DateTime<Utc>,
    /// `exp`, whole seconds
    pub expires_at: DateTime<Utc>,
}

/// A claim that may be serialized either as one string or as a list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// JWT payload as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct JwtClaims {
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<StringOrList>,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<StringOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<String>,
}

impl From<&IssuedTokenClaims> for JwtClaims {
    fn from(claims: &IssuedTokenClaims) -> Self {
        Self {
            iss: claims.issuer.clone(),
            aud: Some(StringOrList::Many(claims.audience.clone())),
            exp: claims.expires_at.timestamp(),
            iat: claims.issued_at.timestamp(),
            jti: claims.jwt_id.clone(),
            sub: claims.subject.clone(),
            client: claims.client.clone(),
            scope: Some(StringOrList::Many(claims.scope.clone())),
            domain: claims.domain.clone(),
            roles: claims.roles.clone(),
            v: claims.version.clone(),
        }
    }
}

impl TryFrom<JwtClaims> for IssuedTokenClaims {
    type Error = TokenError;

    fn try_from(claims: JwtClaims) -> Result<Self, Self::Error> {
        let issued_at = timestamp("iat", claims.iat)?;
        let expires_at = timestamp("exp", claims.exp)?;

        Ok(Self {
            issuer: claims.iss,
            audience: claims.aud.map_or_else(Vec::new, StringOrList::into_vec),
            subject: claims.sub,
            client: claims.client,
            scope: claims.scope.map_or_else(Vec::new, StringOrList::into_vec),
            domain: claims.domain,
            roles: claims.roles,
            version: claims.v,
            jwt_id: claims.jti,
            issued_at,
            expires_at,
        })
    }
}

fn timestamp(name: &str, seconds: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| TokenError::Malformed {
        details: format!("{name} is outside the representable time range"),
    })
}
