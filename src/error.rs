use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid payload: {}", .0.join(" | "))]
    Validation(Vec<String>),

    #[error("Invalid or missing API key")]
    Auth,

    #[error("Only POST /v1/images/generate is supported")]
    MethodNotAllowed,

    #[error("Gemini API failed: {0}")]
    Provider(String),

    #[error("Gemini returned no image data")]
    NoImageData,

    #[error("Reference image error: {0}")]
    ReferenceImage(String),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ImageGenError {
    /// Request-level failures the caller can fix by resubmitting a different request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImageGenError::BadRequest(_)
                | ImageGenError::Validation(_)
                | ImageGenError::Auth
                | ImageGenError::MethodNotAllowed
        )
    }

    /// Failures raised by the provider or the object store.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            ImageGenError::Provider(_)
                | ImageGenError::NoImageData
                | ImageGenError::Decode(_)
                | ImageGenError::Storage(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ImageGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_joins_all_violations() {
        let err = ImageGenError::Validation(vec![
            "prompt must contain at least 1 character".to_string(),
            "width must be an integer between 1 and 2048".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid payload: prompt must contain at least 1 character | width must be an integer between 1 and 2048"
        );
    }

    #[test]
    fn test_error_classes() {
        assert!(ImageGenError::Auth.is_client_error());
        assert!(!ImageGenError::Auth.is_upstream_error());
        assert!(ImageGenError::NoImageData.is_upstream_error());
        assert!(ImageGenError::Storage("denied".into()).is_upstream_error());
        assert!(!ImageGenError::Config("missing".into()).is_client_error());
    }

    #[test]
    fn test_no_image_is_distinct_from_provider_failure() {
        let no_image = ImageGenError::NoImageData;
        assert!(!matches!(no_image, ImageGenError::Provider(_)));
        assert_eq!(no_image.to_string(), "Gemini returned no image data");
    }
}
