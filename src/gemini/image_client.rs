use super::{aspect_ratio::AspectRatio, reference::resolve_references, GenerateImageInput, ImageProvider};
use crate::{
    config::GeminiConfig,
    error::{ImageGenError, Result},
    logger,
    models::{
        gemini::{
            ApiErrorResponse, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
            ImageConfig, RequestContent, RequestPart,
        },
        ProcessedReferenceImage,
    },
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const API_VERSION: &str = "v1beta";
pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct GeminiImageClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiImageClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint without the key; the key travels as a query parameter.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, API_VERSION, self.model
        )
    }

    async fn call(&self, body: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let _timer = logger::timer("Gemini generateContent");

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .timeout(GENERATE_TIMEOUT)
            .send()
            .await
            .map_err(|e| ImageGenError::Provider(e.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ImageGenError::Provider(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .ok()
                .and_then(|body| body.message().map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ImageGenError::Provider(message));
        }

        serde_json::from_str(&text)
            .map_err(|e| ImageGenError::Provider(format!("malformed response body: {}", e)))
    }
}

/// `"{prompt}. Style: {style}"`, or the prompt alone when no style is given.
pub fn prompt_text(prompt: &str, style: Option<&str>) -> String {
    match style.filter(|style| !style.is_empty()) {
        Some(style) => format!("{}. Style: {}", prompt, style),
        None => prompt.to_string(),
    }
}

pub fn build_request(
    input: &GenerateImageInput,
    reference: Option<&ProcessedReferenceImage>,
) -> GenerateContentRequest {
    let mut parts = vec![RequestPart::text(prompt_text(
        &input.prompt,
        input.style.as_deref(),
    ))];

    if let Some(reference) = reference {
        parts.push(RequestPart::inline(&reference.mime_type, &reference.content));
        if let Some(description) = reference.description.as_deref().filter(|d| !d.is_empty()) {
            parts.push(RequestPart::text(format!("Reference image: {}", description)));
        }
    }

    GenerateContentRequest {
        contents: vec![RequestContent { parts }],
        generation_config: GenerationConfig {
            image_config: ImageConfig {
                aspect_ratio: AspectRatio::from_dimensions(input.width, input.height)
                    .as_str()
                    .to_string(),
            },
        },
    }
}

#[async_trait]
impl ImageProvider for GeminiImageClient {
    async fn generate_image(&self, input: GenerateImageInput) -> Result<String> {
        let reference = resolve_references(&self.http, &input.reference_images).await;
        let body = build_request(&input, reference.as_ref());

        log::info!(
            "Generating image with model: {} ({}x{})",
            self.model,
            input.width,
            input.height
        );
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Calling Gemini API {}: {}",
                self.endpoint(),
                serde_json::to_string_pretty(&body).unwrap_or_default()
            );
        }

        let response = self.call(&body).await.map_err(|e| {
            log::error!("Gemini API error: {}", e);
            e
        })?;

        match response.first_inline_image() {
            Some(inline) => Ok(inline.data.clone()),
            None => {
                log::error!(
                    "Gemini response did not include image data: {}",
                    serde_json::to_string(&response).unwrap_or_default()
                );
                Err(ImageGenError::NoImageData)
            }
        }
    }
}
