use crate::{
    error::{ImageGenError, Result},
    models::{DataUrl, ImageMimeType, ProcessedReferenceImage, ReferenceImageInput},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;
use reqwest::Client;
use std::time::Duration;

pub const MAX_REFERENCE_IMAGES: usize = 1;
pub const REFERENCE_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Explicit type, then the type embedded in a data URL, then the URL's
/// extension, then PNG.
pub fn resolve_mime_type(reference: &ReferenceImageInput) -> String {
    if let Some(explicit) = reference.mime_type.as_deref().filter(|m| !m.is_empty()) {
        return explicit.to_string();
    }
    if let Some(DataUrl {
        mime_type: Some(embedded),
        ..
    }) = DataUrl::parse(&reference.url)
    {
        return embedded.to_string();
    }
    ImageMimeType::from_url(&reference.url).as_str().to_string()
}

/// Turns one reference into an inline payload. Data URLs never touch the network.
pub async fn resolve_reference(
    http: &Client,
    reference: &ReferenceImageInput,
) -> Result<ProcessedReferenceImage> {
    let mime_type = resolve_mime_type(reference);

    if reference.url.starts_with("data:") {
        let data_url = DataUrl::parse(&reference.url)
            .ok_or_else(|| ImageGenError::ReferenceImage("malformed data URL".into()))?;
        return Ok(ProcessedReferenceImage {
            content: data_url.payload.to_string(),
            mime_type,
            description: reference.description.clone(),
        });
    }

    log::debug!("Fetching reference image: {}", reference.url);

    let response = http
        .get(&reference.url)
        .timeout(REFERENCE_FETCH_TIMEOUT)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| ImageGenError::ReferenceImage(e.to_string()))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ImageGenError::ReferenceImage(e.to_string()))?;

    Ok(ProcessedReferenceImage {
        content: STANDARD.encode(&bytes),
        mime_type,
        description: reference.description.clone(),
    })
}

/// Resolves the first reference image. Extra references are dropped, and any
/// failure degrades the request to text-only.
pub async fn resolve_references(
    http: &Client,
    references: &[ReferenceImageInput],
) -> Option<ProcessedReferenceImage> {
    if references.is_empty() {
        return None;
    }
    if references.len() > MAX_REFERENCE_IMAGES {
        log::debug!(
            "Ignoring {} extra reference image(s)",
            references.len() - MAX_REFERENCE_IMAGES
        );
    }

    let pending = references
        .iter()
        .take(MAX_REFERENCE_IMAGES)
        .map(|reference| resolve_reference(http, reference));

    match try_join_all(pending).await {
        Ok(resolved) => resolved.into_iter().next(),
        Err(e) => {
            log::warn!(
                "Failed to process reference images, continuing with text-only generation: {}",
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_mime_wins() {
        let reference = ReferenceImageInput::new("data:image/png;base64,AAAA")
            .with_mime_type("image/webp");
        assert_eq!(resolve_mime_type(&reference), "image/webp");
    }

    #[test]
    fn test_data_url_mime_used() {
        let reference = ReferenceImageInput::new("data:image/jpeg;base64,AAAA");
        assert_eq!(resolve_mime_type(&reference), "image/jpeg");
    }

    #[test]
    fn test_extension_lookup_and_fallback() {
        assert_eq!(
            resolve_mime_type(&ReferenceImageInput::new("https://example.com/cat.jpg")),
            "image/jpeg"
        );
        assert_eq!(
            resolve_mime_type(&ReferenceImageInput::new("https://example.com/cat.bmp")),
            "image/png"
        );
    }

    #[tokio::test]
    async fn test_data_url_resolved_without_network() {
        let reference =
            ReferenceImageInput::new("data:image/png;base64,AAAA").with_description("outline");
        let resolved = resolve_reference(&Client::new(), &reference).await.unwrap();
        assert_eq!(
            resolved,
            ProcessedReferenceImage {
                content: "AAAA".to_string(),
                mime_type: "image/png".to_string(),
                description: Some("outline".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_data_url_is_an_error() {
        let reference = ReferenceImageInput::new("data:image/png;base64");
        let err = resolve_reference(&Client::new(), &reference).await.unwrap_err();
        assert!(matches!(err, ImageGenError::ReferenceImage(_)));
    }

    #[tokio::test]
    async fn test_only_first_reference_is_resolved() {
        let references = vec![
            ReferenceImageInput::new("data:image/png;base64,Rklyc3Q="),
            ReferenceImageInput::new("data:image/png;base64,U2Vjb25k"),
        ];
        let resolved = resolve_references(&Client::new(), &references).await.unwrap();
        assert_eq!(resolved.content, "Rklyc3Q=");
    }

    #[tokio::test]
    async fn test_failure_degrades_to_none() {
        let references = vec![ReferenceImageInput::new("data:image/png;base64,")];
        assert!(resolve_references(&Client::new(), &references).await.is_none());
    }
}
