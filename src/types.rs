//! Error types for inspector-auth

use thiserror::Error;

use crate::identity::ProviderError;

/// Top-level error type
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Startup configuration problem (missing credentials, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// MongoDB connect/read/write failure
    #[error("Database error: {0}")]
    Database(String),

    /// Identity service failure
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result alias using ProvisionError
pub type Result<T> = std::result::Result<T, ProvisionError>;
