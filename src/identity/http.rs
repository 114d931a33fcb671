//! HTTP implementation of the identity service client

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::identity::{IdentityProvider, ProviderError, ServiceCredentials};

/// Identity service client over HTTP
pub struct HttpIdentityProvider {
    base_url: String,
    api_token: String,
    client: reqwest::Client,
}

impl HttpIdentityProvider {
    /// Create a new client for the given service base URL
    pub fn new(base_url: impl Into<String>, credentials: ServiceCredentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: credentials.api_token,
            client,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountRequest<'a> {
    email: &'a str,
    password: &'a str,
    display_name: &'a str,
}

#[derive(Deserialize)]
struct AccountResponse {
    id: String,
}

#[async_trait::async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/v1/accounts", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&CreateAccountRequest {
                email,
                password,
                display_name,
            })
            .send()
            .await
            .map_err(|e| ProviderError::Service(format!("create account request failed: {}", e)))?;

        match response.status() {
            StatusCode::CONFLICT => Err(ProviderError::AlreadyExists(email.to_string())),
            status if status.is_success() => {
                let account: AccountResponse = response.json().await.map_err(|e| {
                    ProviderError::Service(format!("malformed create account response: {}", e))
                })?;
                Ok(account.id)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::Service(format!(
                    "create account returned {}: {}",
                    status, body
                )))
            }
        }
    }

    async fn account_id_by_email(&self, email: &str) -> Result<String, ProviderError> {
        let url = format!("{}/v1/accounts/by-email", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| ProviderError::Service(format!("account lookup request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound(email.to_string())),
            status if status.is_success() => {
                let account: AccountResponse = response.json().await.map_err(|e| {
                    ProviderError::Service(format!("malformed account lookup response: {}", e))
                })?;
                Ok(account.id)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::Service(format!(
                    "account lookup returned {}: {}",
                    status, body
                )))
            }
        }
    }
}
