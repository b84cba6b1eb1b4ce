use crate::{
    error::{ImageGenError, Result},
    logger::LogLevel,
};
use std::env;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_IMAGE_SIZE: u32 = 1024;
pub const MAX_IMAGE_SIZE: u32 = 2048;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub region: String,
    pub bucket: String,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDefaults {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub defaults: ImageDefaults,
    pub environment: String,
    pub stage_name: String,
    pub log_level: LogLevel,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            region: DEFAULT_REGION.to_string(),
            bucket: String::new(),
            endpoint: None,
            access_key: None,
            secret_key: None,
        }
    }
}

impl StorageConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }
}

impl Default for ImageDefaults {
    fn default() -> Self {
        ImageDefaults {
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            api_key: String::new(),
        }
    }
}

impl AppConfig {
    pub fn new(gemini: GeminiConfig, storage: StorageConfig, api_key: impl Into<String>) -> Self {
        AppConfig {
            gemini,
            storage,
            server: ServerConfig {
                api_key: api_key.into(),
                ..ServerConfig::default()
            },
            defaults: ImageDefaults::default(),
            environment: "dev".to_string(),
            stage_name: "prod".to_string(),
            log_level: LogLevel::Info,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    pub fn with_defaults(mut self, width: u32, height: u32) -> Self {
        self.defaults = ImageDefaults { width, height };
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, collecting every
    /// violation before failing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut problems = Vec::new();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let gemini_api_key = required(&get, "GEMINI_API_KEY", &mut problems);
        let bucket = required(&get, "IMAGES_BUCKET", &mut problems);
        let api_key = required(&get, "API_KEY", &mut problems);

        let base_url = get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        if url::Url::parse(&base_url).is_err() {
            problems.push(format!("GEMINI_BASE_URL is not a valid URL: {}", base_url));
        }

        let endpoint = get("AWS_S3_ENDPOINT");
        if let Some(endpoint) = &endpoint {
            if url::Url::parse(endpoint).is_err() {
                problems.push(format!("AWS_S3_ENDPOINT is not a valid URL: {}", endpoint));
            }
        }

        let log_level = match get("LOG_LEVEL") {
            Some(raw) => match raw.parse::<LogLevel>() {
                Ok(level) => level,
                Err(e) => {
                    problems.push(e);
                    LogLevel::Info
                }
            },
            None => LogLevel::Info,
        };

        let width = image_dimension(&get, "IMAGE_WIDTH", &mut problems);
        let height = image_dimension(&get, "IMAGE_HEIGHT", &mut problems);

        let port = match get("PORT").or_else(|| get("LOCAL_SERVER_PORT")) {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                problems.push(format!("PORT must be a valid port number, got {}", raw));
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        if !problems.is_empty() {
            return Err(ImageGenError::Config(problems.join("; ")));
        }

        Ok(AppConfig {
            gemini: GeminiConfig {
                api_key: gemini_api_key,
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                base_url,
            },
            storage: StorageConfig {
                region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                bucket,
                endpoint,
                access_key: get("AWS_ACCESS_KEY_ID"),
                secret_key: get("AWS_SECRET_ACCESS_KEY"),
            },
            server: ServerConfig { port, api_key },
            defaults: ImageDefaults { width, height },
            environment: get("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            stage_name: get("STAGE_NAME").unwrap_or_else(|| "prod".to_string()),
            log_level,
        })
    }
}

fn required<G>(get: &G, key: &str, problems: &mut Vec<String>) -> String
where
    G: Fn(&str) -> Option<String>,
{
    get(key).unwrap_or_else(|| {
        problems.push(format!("{} is required", key));
        String::new()
    })
}

fn image_dimension<G>(get: &G, key: &str, problems: &mut Vec<String>) -> u32
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return DEFAULT_IMAGE_SIZE;
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if (1..=MAX_IMAGE_SIZE).contains(&value) => value,
        _ => {
            problems.push(format!(
                "{} must be an integer between 1 and {}, got {}",
                key, MAX_IMAGE_SIZE, raw
            ));
            DEFAULT_IMAGE_SIZE
        }
    }
}
