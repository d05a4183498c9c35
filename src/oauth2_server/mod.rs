// ABOUTME: OAuth 2.0 client-credentials token service with RS256 JWTs as access tokens
// ABOUTME: Credential validation, scope policy, token issuance, verification and HTTP routes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Typed claim set and its JWT wire mapping
pub mod claims;
/// Client credential validation and secret hashing
pub mod credentials;
/// Issuance and introspection orchestration
pub mod endpoints;
/// Access token signing
pub mod issuer;
/// OAuth 2.0 data models and types
pub mod models;
/// Immutable client lookup
pub mod registry;
/// HTTP routes for the token endpoints
pub mod routes;
/// Scope allow-list policy
pub mod scope;
/// Access token verification
pub mod verifier;

/// Typed access token claims
pub use claims::IssuedTokenClaims;
/// Credential checking against the registry
pub use credentials::{CredentialValidator, HashAlgorithm, PasswordHashVerifier, SecretVerifier};
/// Token service orchestrator and its request-level error
pub use endpoints::{TokenService, TokenServiceError};
/// Token signing
pub use issuer::{AccessToken, TokenIssuer};
/// Client record
pub use models::ClientRecord;
/// OAuth 2.0 error response
pub use models::OAuth2Error;
/// Token exchange response
pub use models::TokenResponse;
/// Client registry
pub use registry::ClientRegistry;
/// HTTP routes
pub use routes::OAuth2Routes;
/// Scope policy
pub use scope::ScopePolicy;
/// Token verification
pub use verifier::{TokenError, TokenVerifier};
