//! Client for the external watermarking service.
//!
//! The service is reached through three calls: dispatch a job, read a
//! user's queue, and clear queued jobs. [`WatermarkClient::clear_jobs_for_video`]
//! combines the last two into the best-effort cleanup run after a video is
//! deleted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod cleanup;

pub use cleanup::matching_job_ids;

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum WatermarkError {
    /// Network, DNS, timeout or TLS failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Watermark service returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid watermark service response: {0}")]
    Decode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    /// Service base URL without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl WatermarkConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `WATERMARK_SERVICE_URL` is not set, which disables
    /// dispatch and queue cleanup.
    ///
    /// | Variable                 | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `WATERMARK_SERVICE_URL`  | yes      |         |
    /// | `WATERMARK_TIMEOUT_SECS` | no       | `10`    |
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("WATERMARK_SERVICE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())?;
        let timeout_secs = std::env::var("WATERMARK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Some(Self::new(base_url, Duration::from_secs(timeout_secs)))
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// `GET /queue_status/{numericUserId}` response.
///
/// `jobID[i]` belongs to `videoId[i]`. Older service versions omit
/// `videoId` entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueStatus {
    #[serde(rename = "jobID", default)]
    pub job_ids: Vec<String>,
    #[serde(rename = "videoId", default)]
    pub video_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ClearQueueRequest<'a> {
    user_id: i64,
    job_ids: &'a [String],
}

/// `POST /watermark` body.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchRequest {
    pub user_id: i64,
    pub video_id: String,
    /// Presigned GET URL the service downloads the source from.
    pub video_url: String,
    /// Where the service reports the job result.
    pub callback_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct DispatchResponse {
    #[serde(rename = "jobId", alias = "job_id", default)]
    job_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WatermarkClient {
    client: reqwest::Client,
    base_url: String,
}

impl WatermarkClient {
    pub fn new(config: &WatermarkConfig) -> Result<Self, WatermarkError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read the jobs currently queued for a user.
    pub async fn queue_status(&self, numeric_user_id: i64) -> Result<QueueStatus, WatermarkError> {
        let url = format!("{}/queue_status/{numeric_user_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WatermarkError::HttpStatus(response.status().as_u16()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Remove `job_ids` from a user's queue in one request.
    pub async fn clear_queue(
        &self,
        numeric_user_id: i64,
        job_ids: &[String],
    ) -> Result<(), WatermarkError> {
        let url = format!("{}/clear_queue", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ClearQueueRequest {
                user_id: numeric_user_id,
                job_ids,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(WatermarkError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }

    /// Submit a watermark job. Returns the service's job id when it sends one.
    ///
    /// Any 2xx counts as accepted; an unreadable body only loses the job id.
    pub async fn dispatch(&self, request: &DispatchRequest) -> Result<Option<String>, WatermarkError> {
        let url = format!("{}/watermark", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(WatermarkError::HttpStatus(response.status().as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<DispatchResponse>(&body) {
            Ok(parsed) => Ok(parsed.job_id.filter(|id| !id.trim().is_empty())),
            Err(e) => {
                tracing::warn!(video_id = %request.video_id, error = %e, "Unreadable dispatch response");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_trims_trailing_slash() {
        let config = WatermarkConfig::new(" http://wm.local:8000/ ", Duration::from_secs(1));
        assert_eq!(config.base_url, "http://wm.local:8000");
    }

    #[test]
    fn queue_status_tolerates_missing_fields() {
        let status: QueueStatus = serde_json::from_str(r#"{"jobID": ["a"]}"#).unwrap();
        assert_eq!(status.job_ids, ["a"]);
        assert!(status.video_ids.is_none());

        let empty: QueueStatus = serde_json::from_str("{}").unwrap();
        assert!(empty.job_ids.is_empty());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            WatermarkError::HttpStatus(503).to_string(),
            "Watermark service returned HTTP 503"
        );
    }
}
