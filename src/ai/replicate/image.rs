use super::client::ReplicateHttpClient;
use super::types::{Prediction, PredictionStatus};
use crate::ai::{GenerationInput, ImageGenerationService, ModelOutput, UploadedImage};
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct ReplicateImageClient {
    http: ReplicateHttpClient,
    owner: String,
    name: String,
    poll_interval: Duration,
}

impl ReplicateImageClient {
    pub fn new(api_token: String, model: &str) -> Result<Self> {
        Self::new_with_client(api_token, model, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_token: String,
        model: &str,
        client: reqwest::Client,
    ) -> Result<Self> {
        let (owner, name) = model
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
            .ok_or_else(|| {
                Error::Config(format!("Model must look like owner/name, got '{}'", model))
            })?;

        Ok(Self {
            http: ReplicateHttpClient::new_with_client(api_token, client),
            owner: owner.to_string(),
            name: name.to_string(),
            poll_interval: Duration::from_millis(1000),
        })
    }

    /// Build the client described by `config`, or `None` when no API token
    /// is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(token) = config.replicate_api_token.clone() else {
            return Ok(None);
        };

        let client = Self::new(token, &config.model)?
            .with_base_url(config.replicate_base_url.clone())
            .with_poll_interval(config.poll_interval);
        Ok(Some(client))
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Block until the prediction reaches a terminal status.
    async fn wait_for(&self, mut prediction: Prediction) -> Result<Prediction> {
        while !prediction.status.is_terminal() {
            let url = prediction
                .urls
                .as_ref()
                .and_then(|urls| urls.get.clone())
                .ok_or_else(|| {
                    Error::Replicate(format!(
                        "Prediction {} is {} but has no polling URL",
                        prediction.id,
                        prediction.status.as_str()
                    ))
                })?;

            tracing::debug!(
                "Prediction {} still {}, polling again in {:?}",
                prediction.id,
                prediction.status.as_str(),
                self.poll_interval
            );
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.http.get_prediction(&url).await?;
        }
        Ok(prediction)
    }
}

#[async_trait]
impl ImageGenerationService for ReplicateImageClient {
    async fn generate(&self, image: &UploadedImage) -> Result<ModelOutput> {
        tracing::info!("Running {}/{} via Replicate", self.owner, self.name);

        let input = GenerationInput::for_image(image);
        let prediction = self
            .http
            .create_prediction(&self.owner, &self.name, &input)
            .await?;
        let prediction = self.wait_for(prediction).await?;

        match prediction.status {
            PredictionStatus::Succeeded => prediction
                .output
                .map(ModelOutput::from)
                .ok_or(Error::NoOutput),
            _ => Err(Error::Replicate(prediction.error_message())),
        }
    }
}
