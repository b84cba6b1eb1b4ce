use imagegen::{
    logger::{self, LoggerConfig},
    server, AppConfig, GeminiImageClient, ImageGenerationService, S3ImageStorage,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            logger::init()?;
            log::error!("❌ {}", e);
            return Err(e.into());
        }
    };

    logger::init_with_config(LoggerConfig::for_app(&config))?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using process environment");
    }

    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.server.port,
    );
    logger::log_config_info(&config);

    let provider = GeminiImageClient::new(&config.gemini);
    let storage = S3ImageStorage::new(&config.storage).await?;
    let service =
        ImageGenerationService::new(Arc::new(provider), Arc::new(storage), &config.defaults);

    server::run(&config, service).await?;
    Ok(())
}
