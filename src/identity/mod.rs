//! Identity service client
//!
//! The identity service owns the email-keyed login accounts. This module
//! defines the small surface we consume (create account, look up by email)
//! and the HTTP implementation behind it.

mod credentials;
mod http;

pub use credentials::ServiceCredentials;
pub use http::HttpIdentityProvider;

use thiserror::Error;

/// Failures surfaced by the identity service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// An account with this email already exists. Not a true error for
    /// reconciliation - it triggers the link-existing path.
    #[error("account with email {0} already exists")]
    AlreadyExists(String),

    /// No account found for this email
    #[error("no account found for email {0}")]
    NotFound(String),

    /// Any other provider failure (transport, bad status, bad payload)
    #[error("identity service error: {0}")]
    Service(String),
}

/// Operations consumed from the identity service
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and return its provider-assigned id
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, ProviderError>;

    /// Look up an existing account id by email
    async fn account_id_by_email(&self, email: &str) -> Result<String, ProviderError>;
}
