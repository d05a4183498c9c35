// ABOUTME: Client registry file loading and validation
// ABOUTME: Parses the YAML list of statically configured OAuth2 clients into ClientRecords
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::{AppError, AppResult};
use crate::oauth2_server::models::ClientRecord;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// On-disk layout of the registry file
#[derive(Debug, Deserialize)]
struct ClientRegistryFile {
    #[serde(default)]
    clients: Vec<ClientRecord>,
}

/// Read and validate the client registry file
///
/// # Errors
///
/// Returns an error if the file is missing, is not valid YAML, or contains an
/// invalid or duplicate client entry
pub fn load_client_records(path: &Path) -> AppResult<Vec<ClientRecord>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        AppError::config_missing(format!(
            "Cannot read client registry {}",
            path.display()
        ))
        .with_source(e)
    })?;

    let records = parse_client_records(&contents)?;
    info!(
        path = %path.display(),
        clients = records.len(),
        "Loaded client registry"
    );
    Ok(records)
}

/// Parse and validate registry YAML
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a record has an empty
/// `client_id`, `identity_domain` or `client_secret`, or the same
/// `(client_id, identity_domain)` pair appears twice
pub fn parse_client_records(yaml: &str) -> AppResult<Vec<ClientRecord>> {
    let file: ClientRegistryFile = serde_yaml::from_str(yaml)?;

    let mut seen = HashSet::new();
    for (index, record) in file.clients.iter().enumerate() {
        if record.client_id.trim().is_empty() {
            return Err(AppError::config_invalid(format!(
                "Client entry #{index} has an empty client_id"
            )));
        }
        if record.identity_domain.trim().is_empty() {
            return Err(AppError::config_invalid(format!(
                "Client '{}' has an empty identity_domain",
                record.client_id
            )));
        }
        if record.secret_hash.trim().is_empty() {
            return Err(AppError::config_invalid(format!(
                "Client '{}' has an empty client_secret hash",
                record.client_id
            )));
        }
        if !seen.insert((record.client_id.as_str(), record.identity_domain.as_str())) {
            return Err(AppError::config_invalid(format!(
                "Client '{}' is registered twice in domain '{}'",
                record.client_id, record.identity_domain
            )));
        }
    }

    Ok(file.clients)
}
