pub mod handlers;
pub mod response;

use crate::{config::AppConfig, service::ImageGenerationService};
use actix_web::{middleware::DefaultHeaders, web, App, HttpServer};

pub const GENERATE_PATH: &str = "/v1/images/generate";
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub struct AppState {
    pub service: ImageGenerationService,
    pub api_key: String,
}

impl AppState {
    pub fn new(service: ImageGenerationService, api_key: impl Into<String>) -> Self {
        Self {
            service,
            api_key: api_key.into(),
        }
    }
}

/// Permissive CORS headers attached to every response.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Headers", "Content-Type,x-api-key"))
        .add(("Access-Control-Allow-Methods", "GET,POST,OPTIONS"))
        .add(("Content-Type", "application/json"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .service(
            web::resource(GENERATE_PATH)
                .route(web::post().to(handlers::generate_image))
                .default_service(web::to(handlers::fallback)),
        )
        .service(
            web::resource("/health")
                .route(web::get().to(handlers::health))
                .default_service(web::to(handlers::fallback)),
        )
        .default_service(web::to(handlers::fallback));
}

pub async fn run(config: &AppConfig, service: ImageGenerationService) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(service, &config.server.api_key));

    HttpServer::new(move || {
        App::new()
            .wrap(cors_headers())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(("0.0.0.0", config.server.port))?
    .run()
    .await
}
