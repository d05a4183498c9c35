// ABOUTME: Immutable in-memory registry of statically configured OAuth2 clients
// ABOUTME: Indexes ClientRecords by client_id; one id may exist in several identity domains
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::models::ClientRecord;
use std::collections::HashMap;

/// Read-only client lookup built once at startup
///
/// A client identifier may be registered in more than one identity domain, so
/// every key maps to the full list of candidate records.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Vec<ClientRecord>>,
    timing_reference: Option<String>,
}

impl ClientRegistry {
    /// Index the given records by `client_id`
    #[must_use]
    pub fn new(records: Vec<ClientRecord>) -> Self {
        let timing_reference = records.first().map(|record| record.secret_hash.clone());
        let mut clients: HashMap<String, Vec<ClientRecord>> = HashMap::new();
        for record in records {
            clients
                .entry(record.client_id.clone())
                .or_default()
                .push(record);
        }
        Self {
            clients,
            timing_reference,
        }
    }

    /// All records registered under `client_id`, empty when unknown
    #[must_use]
    pub fn candidates(&self, client_id: &str) -> &[ClientRecord] {
        self.clients.get(client_id).map_or(&[], Vec::as_slice)
    }

    /// A registered hash to compare against when no candidate record exists
    ///
    /// Rejecting an unknown client then costs the same hash work as rejecting a
    /// wrong secret.
    #[must_use]
    pub fn timing_reference(&self) -> Option<&str> {
        self.timing_reference.as_deref()
    }

    /// Number of registered records across all domains
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.values().map(Vec::len).sum()
    }

    /// Whether no client is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(client_id: &str, domain: &str) -> ClientRecord {
        ClientRecord {
            client_id: client_id.into(),
            secret_hash: "$2b$04$unused".into(),
            allowed_scopes: std::iter::once("read".to_owned()).collect(),
            identity_domain: domain.into(),
            roles: Vec::new(),
        }
    }

    #[test]
    fn test_candidates_across_domains() {
        let registry = ClientRegistry::new(vec![
            record("svc", "a.example"),
            record("svc", "b.example"),
            record("other", "a.example"),
        ]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.candidates("svc").len(), 2);
        assert_eq!(registry.candidates("other").len(), 1);
        assert!(registry.candidates("missing").is_empty());
        assert_eq!(registry.timing_reference(), Some("$2b$04$unused"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = ClientRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.candidates("svc").is_empty());
        assert!(registry.timing_reference().is_none());
    }
}
