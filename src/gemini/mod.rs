pub mod aspect_ratio;
pub mod image_client;
pub mod reference;

use crate::{error::Result, models::ReferenceImageInput};
use async_trait::async_trait;

pub use aspect_ratio::AspectRatio;
pub use image_client::GeminiImageClient;

/// What the orchestrator hands to a provider: dimensions are already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateImageInput {
    pub prompt: String,
    pub style: Option<String>,
    pub width: u32,
    pub height: u32,
    pub reference_images: Vec<ReferenceImageInput>,
}

impl GenerateImageInput {
    pub fn new(prompt: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            prompt: prompt.into(),
            style: None,
            width,
            height,
            reference_images: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_references(mut self, references: Vec<ReferenceImageInput>) -> Self {
        self.reference_images = references;
        self
    }
}

/// A generative-image backend.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Returns the generated image as base64.
    async fn generate_image(&self, input: GenerateImageInput) -> Result<String>;
}
