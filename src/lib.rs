pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod server;
pub mod service;
pub mod storage;

pub use config::{AppConfig, GeminiConfig, ImageDefaults, StorageConfig};
pub use error::{ImageGenError, Result};
pub use gemini::{AspectRatio, GeminiImageClient, GenerateImageInput, ImageProvider};
pub use models::{
    GenerateImagePayload, GenerateImageResponse, GenerationJob, ImageMimeType,
    ProcessedReferenceImage, ReferenceImageInput,
};
pub use service::ImageGenerationService;
pub use storage::{ImageStorage, S3ImageStorage};
