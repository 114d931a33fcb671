//! Service credentials loading
//!
//! The identity service requires a JSON credentials file. The path is
//! resolved from the CLI flag, the IDENTITY_CREDENTIALS environment
//! variable, or the default location; absence is fatal at startup.

use serde::Deserialize;
use std::path::Path;

use crate::types::{ProvisionError, Result};

/// Credentials for the identity service
#[derive(Deserialize, Debug, Clone)]
pub struct ServiceCredentials {
    /// Project the accounts belong to
    pub project_id: String,

    /// Bearer token for the identity service API
    pub api_token: String,
}

impl ServiceCredentials {
    /// Load credentials from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::Config(format!(
                "Service credentials not found at {}: {}. Set IDENTITY_CREDENTIALS or place serviceAccountKey.json in the working directory.",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            ProvisionError::Config(format!(
                "Invalid credentials file {}: {}",
                path.display(),
                e
            ))
        })
    }
}
