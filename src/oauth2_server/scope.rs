// ABOUTME: Scope policy for client-credentials token requests
// ABOUTME: A requested scope is granted only on an exact match with the client's allow-list
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::models::ClientRecord;

/// Exact-membership scope check
///
/// A request carries one atomic scope string. It is never split on spaces and
/// no wildcard, prefix or hierarchical matching is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopePolicy;

impl ScopePolicy {
    /// Whether `requested_scope` is literally present in the record's allow-list
    #[must_use]
    pub fn is_allowed(&self, record: &ClientRecord, requested_scope: &str) -> bool {
        record.allowed_scopes.contains(requested_scope)
    }
}
