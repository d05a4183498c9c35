// ABOUTME: System-wide constants and environment-driven defaults for the token service
// ABOUTME: Contains OAuth2 protocol literals, header names, token defaults and env accessors
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Constants Module
//!
//! Protocol literals that are part of the external contract, plus
//! environment-based configuration accessors with their defaults.

/// OAuth2 protocol literals shared by the orchestrator and the HTTP layer
pub mod oauth2 {
    /// The only grant type this service accepts (exact, case-sensitive)
    pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "CLIENT_CREDENTIALS";

    /// Token type returned in every successful issuance
    pub const TOKEN_TYPE_BEARER: &str = "Bearer";

    /// Role assigned when a registry record carries no roles
    pub const DEFAULT_ROLE: &str = "USER";

    /// Separator used when folding roles into the `userRole` introspection field
    pub const ROLE_SEPARATOR: &str = ":";

    /// Prefix of the `kid` header; the identity domain is appended
    pub const KEY_ID_PREFIX: &str = "KeyPair_";

    /// Number of random bytes behind every `jti` (128 bits)
    pub const JWT_ID_BYTES: usize = 16;
}

/// HTTP header and parameter names
pub mod headers {
    /// Header carrying the identity domain of the calling client
    pub const IDENTITY_DOMAIN: &str = "x-oauth-identity-domain-name";

    /// Prefix of an HTTP Basic authorization header value
    pub const BASIC_AUTH_PREFIX: &str = "Basic ";
}

/// HTTP paths served by the transport layer
pub mod paths {
    /// Token issuance endpoint
    pub const TOKEN: &str = "/oauth2/rest/token";

    /// Token introspection endpoint
    pub const TOKEN_INFO: &str = "/oauth2/rest/token/info";

    /// Liveness endpoint
    pub const HEALTH: &str = "/api/health";

    /// Readiness endpoint
    pub const READY: &str = "/api/ready";
}

/// Service identity used in logs and health responses
pub mod service_names {
    /// Service name
    pub const M2M_TOKEN_SERVICE: &str = "m2m-token-service";
}

/// Default values used when the environment does not override them
pub mod defaults {
    /// Default bind address
    pub const HOST: &str = "0.0.0.0";

    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8080;

    /// Default token lifetime in seconds
    pub const TOKEN_TTL_SECONDS: u64 = 3600;

    /// Longest accepted token lifetime (one year)
    pub const MAX_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

    /// Default `iss` claim
    pub const JWT_ISSUER: &str = "http://localhost:8080/oauth2";

    /// Default `aud` claim (comma-separated list)
    pub const JWT_AUDIENCE: &str = "m2m-token-service";

    /// Default `v` claim
    pub const JWT_VERSION: &str = "1.0";

    /// Default location of the PKCS#8 private key
    pub const PRIVATE_KEY_PATH: &str = "keys/private_key.pem";

    /// Default location of the SubjectPublicKeyInfo public key
    pub const PUBLIC_KEY_PATH: &str = "keys/public_key.pem";

    /// Default location of the client registry file
    pub const CLIENTS_PATH: &str = "config/clients.yaml";

    /// Default bcrypt cost used by the hashing tool
    pub const BCRYPT_COST: u32 = 12;
}

/// Environment-based configuration
pub mod env_config {
    use super::defaults;
    use std::env;

    /// Bind address from `HOST`
    #[must_use]
    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| defaults::HOST.to_owned())
    }

    /// HTTP port from `HTTP_PORT`
    ///
    /// Returns `None` for the default case; unparsable values are surfaced so the
    /// caller can reject them.
    #[must_use]
    pub fn http_port() -> Option<String> {
        env::var("HTTP_PORT").ok()
    }

    /// Issuer from `JWT_ISSUER`
    #[must_use]
    pub fn jwt_issuer() -> String {
        env::var("JWT_ISSUER").unwrap_or_else(|_| defaults::JWT_ISSUER.to_owned())
    }

    /// Comma-separated audience list from `JWT_AUDIENCE`
    #[must_use]
    pub fn jwt_audience() -> String {
        env::var("JWT_AUDIENCE").unwrap_or_else(|_| defaults::JWT_AUDIENCE.to_owned())
    }

    /// Raw token lifetime from `JWT_EXPIRATION_SECONDS`
    #[must_use]
    pub fn jwt_expiration_seconds() -> Option<String> {
        env::var("JWT_EXPIRATION_SECONDS").ok()
    }

    /// Private key path from `JWT_PRIVATE_KEY_PATH`
    #[must_use]
    pub fn jwt_private_key_path() -> String {
        env::var("JWT_PRIVATE_KEY_PATH").unwrap_or_else(|_| defaults::PRIVATE_KEY_PATH.to_owned())
    }

    /// Public key path from `JWT_PUBLIC_KEY_PATH`
    #[must_use]
    pub fn jwt_public_key_path() -> String {
        env::var("JWT_PUBLIC_KEY_PATH").unwrap_or_else(|_| defaults::PUBLIC_KEY_PATH.to_owned())
    }

    /// Token version from `JWT_VERSION`
    #[must_use]
    pub fn jwt_version() -> String {
        env::var("JWT_VERSION").unwrap_or_else(|_| defaults::JWT_VERSION.to_owned())
    }

    /// Explicit `x5t` header value from `JWT_X5T_THUMBPRINT`
    #[must_use]
    pub fn jwt_x5t_thumbprint() -> Option<String> {
        env::var("JWT_X5T_THUMBPRINT")
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    /// Client registry path from `OAUTH2_CLIENTS_PATH`
    #[must_use]
    pub fn clients_path() -> String {
        env::var("OAUTH2_CLIENTS_PATH").unwrap_or_else(|_| defaults::CLIENTS_PATH.to_owned())
    }
}
