// ABOUTME: Operator tool that hashes a client secret for the client registry file
// ABOUTME: Prints a bcrypt or Argon2 hash and checks it with the server's own verifier
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Client Secret Hashing Tool
//!
//! ```text
//! hash-client-secret 's3cr3t' --cost 12
//! hash-client-secret 's3cr3t' --algorithm argon2
//! ```
//!
//! Paste the printed value into the `client_secret` field of the registry file.

use anyhow::{bail, Result};
use clap::Parser;
use m2m_token_service::{
    constants::defaults::BCRYPT_COST,
    oauth2_server::{
        credentials::hash_client_secret, HashAlgorithm, PasswordHashVerifier, SecretVerifier,
    },
};

#[derive(Parser)]
#[command(name = "hash-client-secret")]
#[command(about = "Hash a client secret for the m2m-token-service client registry")]
struct Args {
    /// Plaintext client secret
    secret: String,

    /// bcrypt cost factor (4-31)
    #[arg(long, default_value_t = BCRYPT_COST)]
    cost: u32,

    /// Hashing scheme
    #[arg(long, value_enum, default_value_t = HashAlgorithm::Bcrypt)]
    algorithm: HashAlgorithm,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.secret.is_empty() {
        bail!("Refusing to hash an empty secret");
    }

    let hash = hash_client_secret(&args.secret, args.algorithm, args.cost)?;

    if !PasswordHashVerifier.matches(&args.secret, &hash) {
        bail!("Generated hash does not verify; not printing it");
    }

    println!("{hash}");
    Ok(())
}
