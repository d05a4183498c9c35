// ABOUTME: Environment-based configuration for the HTTP server and JWT signing
// ABOUTME: Loads, validates and summarizes ServerConfig and JwtConfig from environment variables
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::{defaults, env_config};
use crate::errors::{AppError, AppResult};
use chrono::Duration;
use std::path::PathBuf;
use tracing::info;

/// Token signing and claim settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// `iss` claim
    pub issuer: String,
    /// `aud` claim, in configured order
    pub audience: Vec<String>,
    /// Token lifetime in seconds
    pub expiration_seconds: u64,
    /// PKCS#8 PEM private key location
    pub private_key_path: PathBuf,
    /// SubjectPublicKeyInfo PEM public key location
    pub public_key_path: PathBuf,
    /// `v` claim
    pub version: String,
    /// Explicit `x5t` header value, derived from the public key when `None`
    pub x5t_thumbprint: Option<String>,
}

impl JwtConfig {
    /// Load JWT settings from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_EXPIRATION_SECONDS` is not a positive integer
    pub fn from_env() -> AppResult<Self> {
        let expiration_seconds = match env_config::jwt_expiration_seconds() {
            Some(raw) => parse_positive_seconds("JWT_EXPIRATION_SECONDS", &raw)?,
            None => defaults::TOKEN_TTL_SECONDS,
        };

        Ok(Self {
            issuer: env_config::jwt_issuer(),
            audience: parse_audience(&env_config::jwt_audience()),
            expiration_seconds,
            private_key_path: PathBuf::from(env_config::jwt_private_key_path()),
            public_key_path: PathBuf::from(env_config::jwt_public_key_path()),
            version: env_config::jwt_version(),
            x5t_thumbprint: env_config::jwt_x5t_thumbprint(),
        })
    }

    /// Token lifetime as a signed duration
    ///
    /// # Errors
    ///
    /// Returns an error if the lifetime is zero or longer than
    /// [`defaults::MAX_TOKEN_TTL_SECONDS`]
    pub fn token_ttl(&self) -> AppResult<Duration> {
        Some(self.expiration_seconds)
            .filter(|seconds| (1..=defaults::MAX_TOKEN_TTL_SECONDS).contains(seconds))
            .and_then(|seconds| i64::try_from(seconds).ok())
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                AppError::config_invalid(format!(
                    "JWT_EXPIRATION_SECONDS must be between 1 and {}, got {}",
                    defaults::MAX_TOKEN_TTL_SECONDS,
                    self.expiration_seconds
                ))
            })
    }

    /// Validate JWT settings
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer is blank, no audience is configured or the
    /// lifetime is not a usable positive duration
    pub fn validate(&self) -> AppResult<()> {
        if self.issuer.trim().is_empty() {
            return Err(AppError::config_invalid("JWT_ISSUER must not be empty"));
        }
        if self.audience.is_empty() {
            return Err(AppError::config_invalid(
                "JWT_AUDIENCE must name at least one audience",
            ));
        }
        self.token_ttl()?;
        Ok(())
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub http_port: u16,
    /// Token settings
    pub jwt: JwtConfig,
    /// Client registry file location
    pub clients_path: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparsable or the result
    /// fails validation
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let http_port = match env_config::http_port() {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                AppError::config_invalid(format!("Invalid HTTP_PORT value '{raw}'"))
                    .with_source(e)
            })?,
            None => defaults::HTTP_PORT,
        };

        let config = Self {
            host: env_config::host(),
            http_port,
            jwt: JwtConfig::from_env()?,
            clients_path: PathBuf::from(env_config::clients_path()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address is blank or the JWT settings are invalid
    pub fn validate(&self) -> AppResult<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::config_invalid("HOST must not be empty"));
        }
        self.jwt.validate()
    }

    /// `host:port` string suitable for `TcpListener::bind`
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "M2M Token Service Configuration:\n\
             - Bind Address: {}\n\
             - Issuer: {}\n\
             - Audience: {}\n\
             - Token Lifetime: {}s\n\
             - Token Version: {}\n\
             - Private Key: {}\n\
             - Public Key: {}\n\
             - x5t: {}\n\
             - Client Registry: {}",
            self.bind_address(),
            self.jwt.issuer,
            self.jwt.audience.join(","),
            self.jwt.expiration_seconds,
            self.jwt.version,
            self.jwt.private_key_path.display(),
            self.jwt.public_key_path.display(),
            if self.jwt.x5t_thumbprint.is_some() {
                "Configured"
            } else {
                "Derived from public key"
            },
            self.clients_path.display(),
        )
    }
}

/// Split a comma-separated audience list, dropping blanks
fn parse_audience(audience: &str) -> Vec<String> {
    audience
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_positive_seconds(name: &str, raw: &str) -> AppResult<u64> {
    let seconds = raw.trim().parse::<u64>().map_err(|e| {
        AppError::config_invalid(format!("Invalid {name} value '{raw}'")).with_source(e)
    })?;
    if seconds == 0 {
        return Err(AppError::config_invalid(format!(
            "{name} must be a positive number of seconds"
        )));
    }
    Ok(seconds)
}
