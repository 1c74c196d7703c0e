use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::error::DomainError;

/// External address-existence check, answered synchronously within the
/// request.
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    async fn exists(&self, email: &str) -> Result<bool, DomainError>;
}

#[derive(Debug, Deserialize)]
struct VerifierResponse {
    data: VerifierData,
}

#[derive(Debug, Deserialize)]
struct VerifierData {
    result: String,
}

/// Client for the hunter.io email verifier.
#[derive(Clone)]
pub struct HunterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HunterClient {
    pub fn new(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl EmailVerifier for HunterClient {
    async fn exists(&self, email: &str) -> Result<bool, DomainError> {
        let url = format!("{}/email-verifier", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("email", email), ("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| DomainError::Internal(format!("email verifier unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::Internal(format!(
                "email verifier responded with {}",
                response.status()
            )));
        }

        let parsed: VerifierResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Internal(format!("email verifier response: {}", e)))?;

        Ok(parsed.data.result == "deliverable")
    }
}
