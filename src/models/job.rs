use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Outcome of one completed generation. Lives only as long as the response.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    pub job_id: Uuid,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub processing_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub image_url: String,
    pub created_at: String,
    pub completed_at: String,
    /// Seconds.
    pub processing_time: f64,
}

impl From<&GenerationJob> for GenerateImageResponse {
    fn from(job: &GenerationJob) -> Self {
        GenerateImageResponse {
            job_id: job.job_id.to_string(),
            status: JobStatus::Completed,
            image_url: job.image_url.clone(),
            created_at: iso_timestamp(&job.created_at),
            completed_at: iso_timestamp(&job.completed_at),
            processing_time: job.processing_time.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: JobStatus,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorResponse {
            status: JobStatus::Failed,
            error: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        HealthResponse {
            status: "healthy".to_string(),
            timestamp: iso_timestamp(&Utc::now()),
        }
    }
}

/// RFC 3339, UTC, millisecond precision (`2024-01-01T00:00:00.000Z`).
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
