use super::AppState;
use crate::{
    error::ImageGenError,
    models::{GenerateImagePayload, GenerateImageResponse, HealthResponse},
};
use actix_web::{http::Method, web, HttpRequest, HttpResponse};

pub const API_KEY_HEADER: &str = "x-api-key";

type HandlerResult = Result<HttpResponse, ImageGenError>;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy())
}

/// Everything that is not a generation request: CORS preflight, any GET path
/// containing `/health`, and 405 for the rest.
pub async fn fallback(req: HttpRequest) -> HandlerResult {
    if req.method() == Method::OPTIONS {
        return Ok(HttpResponse::NoContent().finish());
    }
    if req.method() == Method::GET && req.path().contains("/health") {
        return Ok(health().await);
    }
    log::debug!("Rejecting {} {}", req.method(), req.path());
    Err(ImageGenError::MethodNotAllowed)
}

fn authorize(req: &HttpRequest, expected: &str) -> Result<(), ImageGenError> {
    let supplied = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if supplied.is_empty() || supplied != expected {
        return Err(ImageGenError::Auth);
    }
    Ok(())
}

fn parse_payload(body: &[u8]) -> Result<GenerateImagePayload, ImageGenError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ImageGenError::BadRequest("Request body is required".into()));
    }
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|_| ImageGenError::BadRequest("Unable to parse JSON body".into()))?;
    GenerateImagePayload::from_json(&value)
}

pub async fn generate_image(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HandlerResult {
    authorize(&req, &state.api_key)?;
    let payload = parse_payload(&body)?;

    let job = state.service.create_image(payload).await?;

    let response = GenerateImageResponse::from(&job);
    log::debug!(
        "Image generated: {}",
        serde_json::to_string(&response).unwrap_or_default()
    );
    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_body_required() {
        let err = parse_payload(b"  \n").unwrap_err();
        assert_eq!(err.to_string(), "Request body is required");
    }

    #[test]
    fn test_unparseable_body() {
        let err = parse_payload(b"{prompt: a cat").unwrap_err();
        assert_eq!(err.to_string(), "Unable to parse JSON body");
    }

    #[test]
    fn test_wrong_types_are_validation_errors() {
        let err = parse_payload(br#"{"prompt":"a cat","width":"wide"}"#).unwrap_err();
        assert!(matches!(err, ImageGenError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Invalid payload: width must be an integer between 1 and 2048"
        );
    }

    #[test]
    fn test_wrong_types_do_not_hide_other_violations() {
        let err = parse_payload(br#"{"prompt":"","width":"wide","style":"ok"}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid payload: prompt must contain at least 1 character | \
             width must be an integer between 1 and 2048"
        );
    }

    #[test]
    fn test_valid_body() {
        let payload = parse_payload(br#"{"prompt":"a cat","width":1024,"height":1024}"#).unwrap();
        assert_eq!(payload.prompt, "a cat");
        assert_eq!(payload.height, Some(1024));
    }
}
