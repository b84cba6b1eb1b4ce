use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Writes `body` under `key` and returns the URL the object is served from.
    async fn upload(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String>;

    fn public_url(&self, key: &str) -> String;
}
