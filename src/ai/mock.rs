use super::{ImageGenerationService, ModelOutput, UploadedImage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted stand-in for the hosted model.
///
/// Responses are handed out in order and cycle once exhausted. With no
/// scripted response it returns a fixed URL.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    call_count: Arc<Mutex<usize>>,
    last_image: Arc<Mutex<Option<UploadedImage>>>,
}

#[derive(Clone)]
enum MockResponse {
    Output(ModelOutput),
    Failure(String),
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_image: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_output(self, output: ModelOutput) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockResponse::Output(output));
        self
    }

    /// Queue a failure surfaced as a remote API error with `message`.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockResponse::Failure(message.into()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_image(&self) -> Option<UploadedImage> {
        self.last_image.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate(&self, image: &UploadedImage) -> Result<ModelOutput> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        *self.last_image.lock().unwrap() = Some(image.clone());

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(ModelOutput::UrlString(
                "https://mock-replicate.example.com/output.png".to_string(),
            ));
        }

        let index = (*count - 1) % responses.len();
        match &responses[index] {
            MockResponse::Output(output) => Ok(output.clone()),
            MockResponse::Failure(message) => Err(Error::Replicate(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> UploadedImage {
        UploadedImage::new(vec![1, 2, 3], Some("image/png".to_string()))
    }

    #[tokio::test]
    async fn test_mock_default_output() {
        let client = MockImageGenerationClient::new();
        let output = client.generate(&sample_image()).await.unwrap();
        assert!(matches!(output, ModelOutput::UrlString(_)));
    }

    #[tokio::test]
    async fn test_mock_scripted_responses_cycle() {
        let client = MockImageGenerationClient::new()
            .with_output(ModelOutput::UrlString("first".to_string()))
            .with_failure("quota exceeded");

        let first = client.generate(&sample_image()).await.unwrap();
        assert_eq!(first, ModelOutput::UrlString("first".to_string()));

        let err = client.generate(&sample_image()).await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");

        // Should cycle back
        let third = client.generate(&sample_image()).await.unwrap();
        assert_eq!(third, ModelOutput::UrlString("first".to_string()));
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let client = MockImageGenerationClient::new();
        assert_eq!(client.get_call_count(), 0);
        assert!(client.last_image().is_none());

        client.generate(&sample_image()).await.unwrap();
        assert_eq!(client.get_call_count(), 1);
        assert_eq!(client.last_image().unwrap().bytes, vec![1, 2, 3]);
    }
}
