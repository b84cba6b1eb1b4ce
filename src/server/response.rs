use crate::{error::ImageGenError, models::ErrorResponse};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

impl ResponseError for ImageGenError {
    fn status_code(&self) -> StatusCode {
        match self {
            ImageGenError::BadRequest(_) | ImageGenError::Validation(_) => StatusCode::BAD_REQUEST,
            ImageGenError::Auth => StatusCode::FORBIDDEN,
            ImageGenError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ImageGenError::Provider(_)
            | ImageGenError::NoImageData
            | ImageGenError::ReferenceImage(_)
            | ImageGenError::Decode(_)
            | ImageGenError::Storage(_) => StatusCode::BAD_GATEWAY,
            ImageGenError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_upstream_error() {
            log::error!("Image generation failed: {}", self);
        } else if self.is_client_error() {
            log::warn!("Rejected request: {}", self);
        } else {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}
