//! Remote image generation
//!
//! Encodes an uploaded photo as a data URI and hands it, together with the
//! fixed gigafy prompt, to a hosted image model.

pub mod mime;
pub mod mock;
pub mod output;
pub mod replicate;

pub use mock::MockImageGenerationClient;
pub use output::ModelOutput;
pub use replicate::ReplicateImageClient;

use crate::{prompts, Result};
use async_trait::async_trait;
use base64::Engine as _;
use serde::Serialize;

/// Raw upload as received from the caller.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    pub fn mime_type(&self) -> String {
        mime::resolve_mime(self.content_type.as_deref(), &self.bytes)
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Model input sent with every prediction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationInput {
    pub prompt: String,
    pub image: String,
    pub aspect_ratio: String,
    pub safety_filter_level: String,
}

impl GenerationInput {
    pub fn for_image(image: &UploadedImage) -> Self {
        Self {
            prompt: prompts::GIGAFY.to_string(),
            image: image.data_uri(),
            aspect_ratio: prompts::ASPECT_RATIO.to_string(),
            safety_filter_level: prompts::SAFETY_FILTER_LEVEL.to_string(),
        }
    }
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate(&self, image: &UploadedImage) -> Result<ModelOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_uses_declared_type() {
        let image = UploadedImage::new(b"hello".to_vec(), Some("image/jpeg".to_string()));
        assert_eq!(image.data_uri(), "data:image/jpeg;base64,aGVsbG8=");
    }

    #[test]
    fn test_data_uri_defaults_to_png() {
        let image = UploadedImage::new(b"hello".to_vec(), None);
        assert_eq!(image.data_uri(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_generation_input_fixed_parameters() {
        let image = UploadedImage::new(vec![0xFF, 0xD8, 0xFF, 0xE0], None);
        let input = GenerationInput::for_image(&image);

        assert_eq!(input.prompt, prompts::GIGAFY);
        assert_eq!(input.aspect_ratio, "1:1");
        assert_eq!(input.safety_filter_level, "block_only_high");
        assert!(input.image.starts_with("data:image/jpeg;base64,"));
    }
}
