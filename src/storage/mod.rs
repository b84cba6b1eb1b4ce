pub mod s3;
pub mod traits;

pub use s3::S3ImageStorage;
pub use traits::ImageStorage;

/// Object key for a job's image.
pub fn image_key(job_id: &uuid::Uuid) -> String {
    format!("images/{}.png", job_id)
}

/// URL an uploaded object is served from.
///
/// Without a custom endpoint this is the virtual-hosted AWS URL. With one,
/// objects are written path-style, so the URL is `{endpoint}/{bucket}/{key}`.
pub fn public_object_url(bucket: &str, region: &str, endpoint: Option<&str>, key: &str) -> String {
    match endpoint {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}
