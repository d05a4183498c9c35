// ABOUTME: Route module organization for the token service HTTP endpoints
// ABOUTME: Groups operational routes that sit beside the OAuth 2.0 token routes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Operational HTTP routes

/// Liveness and readiness checks
pub mod health;

pub use health::HealthRoutes;
