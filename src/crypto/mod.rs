// ABOUTME: Cryptography module for token signing key material
// ABOUTME: Centralizes RSA key loading and thumbprint derivation for the token service
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Cryptographic utilities

pub mod keys;

pub use keys::SigningKeys;
