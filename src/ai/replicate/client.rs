use super::types::{Prediction, PredictionRequest};
use crate::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;

pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com";

/// Thin REST client for Replicate's predictions API.
pub struct ReplicateHttpClient {
    client: Client,
    api_token: String,
    base_url: String,
}

impl ReplicateHttpClient {
    pub fn new(api_token: String) -> Self {
        Self::new_with_client(api_token, Client::new())
    }

    pub fn new_with_client(api_token: String, client: Client) -> Self {
        Self {
            client,
            api_token,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Start a prediction against the latest version of `owner/name`.
    ///
    /// `Prefer: wait` asks the API to hold the connection until the
    /// prediction finishes; it may still answer with a non-terminal status.
    pub async fn create_prediction<I: Serialize>(
        &self,
        owner: &str,
        name: &str,
        input: I,
    ) -> Result<Prediction> {
        let url = format!(
            "{}/v1/models/{}/{}/predictions",
            self.base_url, owner, name
        );
        tracing::debug!("Creating Replicate prediction for {}/{}", owner, name);

        let request = self
            .client
            .post(&url)
            .header("Prefer", "wait")
            .json(&PredictionRequest { input });
        self.send(request).await
    }

    /// Fetch the current state of a prediction from its `urls.get` link.
    pub async fn get_prediction(&self, url: &str) -> Result<Prediction> {
        self.send(self.client.get(url)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Prediction> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Replicate: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Replicate API error (status {}): {}", status, error_text);
            return Err(Error::Replicate(format!(
                "Replicate API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Replicate response: {}\nBody: {}", e, body);
            Error::Replicate(format!("Failed to parse Replicate response: {}", e))
        })
    }
}
