use crate::{
    config::ImageDefaults,
    error::{ImageGenError, Result},
    gemini::{GenerateImageInput, ImageProvider},
    models::{GenerateImagePayload, GenerationJob},
    storage::{image_key, ImageStorage},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub const IMAGE_CONTENT_TYPE: &str = "image/png";

/// Runs one generation job: provider call, decode, upload.
#[derive(Clone)]
pub struct ImageGenerationService {
    provider: Arc<dyn ImageProvider>,
    storage: Arc<dyn ImageStorage>,
    defaults: ImageDefaults,
}

impl ImageGenerationService {
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        storage: Arc<dyn ImageStorage>,
        defaults: &ImageDefaults,
    ) -> Self {
        Self {
            provider,
            storage,
            defaults: *defaults,
        }
    }

    /// Payload dimensions win over the configured defaults. Callers are
    /// expected to have validated the payload.
    pub fn resolve_dimensions(&self, payload: &GenerateImagePayload) -> (u32, u32) {
        let pick = |requested: Option<i64>, fallback: u32| {
            requested
                .and_then(|value| u32::try_from(value).ok())
                .filter(|value| *value > 0)
                .unwrap_or(fallback)
        };
        (
            pick(payload.width, self.defaults.width),
            pick(payload.height, self.defaults.height),
        )
    }

    pub async fn create_image(&self, payload: GenerateImagePayload) -> Result<GenerationJob> {
        let job_id = Uuid::new_v4();
        let created_at = Utc::now();
        let started = Instant::now();
        let (width, height) = self.resolve_dimensions(&payload);

        log::info!("🎨 Job {} started ({}x{})", job_id, width, height);

        let input = GenerateImageInput {
            prompt: payload.prompt,
            style: payload.style,
            width,
            height,
            reference_images: payload.reference_images.unwrap_or_default(),
        };
        let encoded = self.provider.generate_image(input).await?;

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ImageGenError::Decode(e.to_string()))?;

        let key = image_key(&job_id);
        let image_url = self
            .storage
            .upload(&key, bytes, IMAGE_CONTENT_TYPE)
            .await
            .map_err(|e| {
                log::error!("Upload failed for job {}: {}", job_id, e);
                e
            })?;

        let job = GenerationJob {
            job_id,
            image_url,
            created_at,
            completed_at: Utc::now(),
            processing_time: started.elapsed(),
        };
        log::info!(
            "✅ Job {} completed in {:.2}s",
            job.job_id,
            job.processing_time.as_secs_f64()
        );
        Ok(job)
    }
}
