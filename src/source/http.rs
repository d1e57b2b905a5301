use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{AlertSource, SourceError};
use crate::alerts::AlertDefinition;

/// HTTP implementation of the alert source backend
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    value: f64,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Remote(format!("{}: {}", status, body)));
        }
        Ok(response)
    }
}

#[async_trait]
impl AlertSource for HttpSource {
    async fn list_alerts(&self) -> Result<Vec<AlertDefinition>, SourceError> {
        let url = format!("{}/alerts", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }

    async fn query(&self, query: &str) -> Result<f64, SourceError> {
        let url = format!("{}/query", self.base_url);
        let request = serde_json::json!({ "query": query });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        Ok(result.value)
    }

    async fn notify(&self, name: &str, state: &str) -> Result<(), SourceError> {
        let url = format!("{}/notify", self.base_url);
        let request = serde_json::json!({ "name": name, "state": state });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        Self::check_status(response).await?;

        Ok(())
    }

    async fn resolve(&self, name: &str) -> Result<(), SourceError> {
        let url = format!("{}/resolve", self.base_url);
        let request = serde_json::json!({ "name": name });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        Self::check_status(response).await?;

        Ok(())
    }
}
