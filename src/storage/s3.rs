use crate::{
    config::StorageConfig,
    error::{ImageGenError, Result},
    logger,
    storage::{public_object_url, traits::ImageStorage},
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{retry::RetryConfig, Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata},
    primitives::ByteStream,
    Client,
};

#[derive(Clone)]
pub struct S3ImageStorage {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl S3ImageStorage {
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        if config.bucket.is_empty() {
            return Err(ImageGenError::Config("Images bucket name is required".into()));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "imagegen-static",
            ));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .retry_config(RetryConfig::disabled());
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::from_client(
            Client::from_conf(builder.build()),
            config,
        ))
    }

    pub fn from_client(client: Client, config: &StorageConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ImageStorage for S3ImageStorage {
    async fn upload(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String> {
        let _timer = logger::timer("S3 PutObject");
        log::info!(
            "Uploading {} bytes to s3://{}/{}",
            body.len(),
            self.bucket,
            key
        );

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                if let Some(service_error) = e.as_service_error() {
                    log::error!("S3 service error code: {:?}", service_error.code());
                    ImageGenError::Storage(format!(
                        "{} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    ImageGenError::Storage(DisplayErrorContext(&e).to_string())
                }
            })?;

        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.bucket, &self.region, self.endpoint.as_deref(), key)
    }
}
