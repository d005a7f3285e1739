//! Watermark job dispatch and the result callback.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use saivd_cloud::watermark::DispatchRequest;
use saivd_core::error::CoreError;
use saivd_core::profile::validate_profile_url;
use saivd_core::types::EntityId;
use saivd_core::validation::parse_video_id;
use saivd_core::video::WatermarkStatus;
use saivd_db::models::video::{Video, WatermarkResult};
use saivd_db::repositories::{ProfileRepo, VideoRepo};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::video::find_owned;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying the shared callback secret.
pub const CALLBACK_SECRET_HEADER: &str = "x-watermark-secret";

/// Path the watermark service posts results to.
pub const CALLBACK_PATH: &str = "/api/callbacks/watermark";

/// A claim with no progress for this long is treated as abandoned.
const STALE_CLAIM_AFTER: Duration = Duration::from_secs(15 * 60);

const NO_JOB_IN_FLIGHT: &str = "No watermark job is in progress for this video";

/// Longest error message stored from a callback.
const MAX_ERROR_LEN: usize = 1000;

/// Result posted by the watermark service when a job finishes.
#[derive(Debug, Deserialize)]
pub struct WatermarkCallback {
    #[serde(alias = "videoId")]
    pub video_id: String,
    #[serde(default, alias = "jobId")]
    pub job_id: Option<String>,
    /// `completed`, or `error` / `failed`.
    pub status: String,
    #[serde(default, alias = "watermarkedUrl")]
    pub watermarked_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CallbackAck {
    pub video_id: EntityId,
    pub watermark_status: String,
}

/// POST /api/videos/{videoId}/watermark
///
/// Submit the video to the watermark service. Returns 202 with the video in
/// `processing` state, or already settled if the callback won the race; 409
/// if a job is already running. A failed presign or dispatch leaves the
/// video in `error`.
pub async fn dispatch_watermark(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(video_id): Path<String>,
) -> AppResult<(StatusCode, Json<DataResponse<Video>>)> {
    let client = state
        .watermark
        .clone()
        .ok_or_else(|| AppError::ServiceUnavailable("Watermark service is not configured".into()))?;

    let video = find_owned(&state, &auth_user, &video_id).await?;
    let profile = ProfileRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User"))?;

    let claimed =
        VideoRepo::claim_for_watermark(&state.pool, video.id, auth_user.user_id, STALE_CLAIM_AFTER)
            .await?
            .ok_or_else(|| CoreError::Conflict("A watermark job is already in progress".into()))?;

    let source = match state.storage.presign_get(&claimed.storage_key).await {
        Ok(source) => source,
        Err(e) => {
            release_claim(&state, claimed.id, format!("Presign failed: {e}")).await?;
            return Err(e.into());
        }
    };
    let request = DispatchRequest {
        user_id: profile.numeric_user_id,
        video_id: claimed.id.to_string(),
        video_url: source.url,
        callback_url: format!("{}{CALLBACK_PATH}", state.config.public_base_url),
    };

    let job_id = match client.dispatch(&request).await {
        Ok(job_id) => job_id,
        Err(e) => {
            release_claim(&state, claimed.id, format!("Dispatch failed: {e}")).await?;
            return Err(e.into());
        }
    };

    // The callback may settle the job before its id is recorded here.
    let video = match VideoRepo::set_watermark_job(&state.pool, claimed.id, job_id.as_deref()).await? {
        Some(video) => video,
        None => VideoRepo::find_by_id(&state.pool, claimed.id)
            .await?
            .ok_or_else(|| CoreError::not_found("Video"))?,
    };
    tracing::info!(
        video_id = %video.id,
        job_id = job_id.as_deref().unwrap_or("-"),
        status = %video.watermark_status,
        "Watermark job dispatched"
    );

    Ok((StatusCode::ACCEPTED, Json(DataResponse::new(video))))
}

/// POST /api/callbacks/watermark
///
/// Record a job's terminal outcome on its video. When a callback secret is
/// configured the request must carry it in `X-Watermark-Secret`.
pub async fn watermark_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<WatermarkCallback>,
) -> AppResult<Json<DataResponse<CallbackAck>>> {
    if let Some(expected) = &state.config.watermark_callback_secret {
        let presented = headers
            .get(CALLBACK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !secrets_match(presented, expected) {
            tracing::warn!("Rejected watermark callback with bad secret");
            return Err(AppError::unauthorized("Invalid callback secret"));
        }
    }

    let video_id = parse_video_id(input.video_id.trim())?;
    let status = WatermarkStatus::from_job_status(&input.status).ok_or_else(|| {
        CoreError::validation(format!("Unsupported job status '{}'", input.status))
    })?;
    let watermarked_url = match &input.watermarked_url {
        Some(raw) => validate_profile_url("watermarked_url", raw)?,
        None => None,
    };

    let video = VideoRepo::find_by_id(&state.pool, video_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Video"))?;

    if !video.status()?.is_active() {
        return Err(CoreError::Conflict(NO_JOB_IN_FLIGHT.into()).into());
    }
    let job_id = input.job_id.as_deref().map(str::trim).filter(|j| !j.is_empty());
    if !job_matches(&video, job_id) {
        return Err(CoreError::Conflict(
            "Job id does not match the video's current watermark job".into(),
        )
        .into());
    }

    let result = match status {
        WatermarkStatus::Completed => WatermarkResult {
            status,
            watermarked_url,
            error: None,
        },
        _ => WatermarkResult {
            status,
            watermarked_url: None,
            error: Some(truncate_error(
                input.error.as_deref().unwrap_or("Watermark job failed"),
            )),
        },
    };

    let updated = VideoRepo::apply_watermark_result(&state.pool, video.id, &result)
        .await?
        .ok_or_else(|| CoreError::Conflict(NO_JOB_IN_FLIGHT.into()))?;
    tracing::info!(video_id = %updated.id, status = %status, "Watermark result recorded");

    Ok(Json(DataResponse::new(CallbackAck {
        video_id: updated.id,
        watermark_status: updated.watermark_status,
    })))
}

/// Put a claimed video into `error` so the owner can dispatch it again.
async fn release_claim(state: &AppState, video_id: EntityId, message: String) -> AppResult<()> {
    tracing::warn!(video_id = %video_id, error = %message, "Watermark dispatch aborted");
    let failure = WatermarkResult {
        status: WatermarkStatus::Error,
        watermarked_url: None,
        error: Some(truncate_error(&message)),
    };
    VideoRepo::apply_watermark_result(&state.pool, video_id, &failure).await?;
    Ok(())
}

/// Whether a reported job id belongs to the video's current job.
///
/// A `pending` video has not recorded its id yet, so any report is
/// accepted. Once `processing`, the stored id must match; a job accepted
/// without an id only takes callbacks that omit one.
fn job_matches(video: &Video, reported: Option<&str>) -> bool {
    match (video.watermark_job_id.as_deref(), reported) {
        (Some(current), Some(reported)) => current == reported,
        (None, Some(_)) => video.watermark_status != WatermarkStatus::Processing.as_str(),
        (_, None) => true,
    }
}

/// Compare fixed-length digests so timing does not reveal the secret.
fn secrets_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn truncate_error(message: &str) -> String {
    message.trim().chars().take(MAX_ERROR_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_comparison() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret", "s3cre"));
        assert!(!secrets_match("", "s3cret"));
    }

    #[test]
    fn callback_accepts_camel_case() {
        let body: WatermarkCallback = serde_json::from_str(
            r#"{"videoId":"v","jobId":"j","status":"completed","watermarkedUrl":"https://x/y.mp4"}"#,
        )
        .unwrap();
        assert_eq!(body.job_id.as_deref(), Some("j"));
        assert_eq!(body.watermarked_url.as_deref(), Some("https://x/y.mp4"));
    }

    fn video_in(status: WatermarkStatus, job_id: Option<&str>) -> Video {
        let now = chrono::Utc::now();
        Video {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            title: None,
            content_type: "video/mp4".to_string(),
            file_size: None,
            storage_key: "videos/a/b.mp4".to_string(),
            watermark_status: status.as_str().to_string(),
            watermark_job_id: job_id.map(str::to_string),
            watermarked_url: None,
            watermark_error: None,
            upload_date: now,
            updated_at: now,
        }
    }

    #[test]
    fn job_id_matching() {
        let running = video_in(WatermarkStatus::Processing, Some("job-1"));
        assert!(job_matches(&running, Some("job-1")));
        assert!(job_matches(&running, None));
        assert!(!job_matches(&running, Some("job-2")));

        let anonymous = video_in(WatermarkStatus::Processing, None);
        assert!(job_matches(&anonymous, None));
        assert!(!job_matches(&anonymous, Some("job-1")));

        let claimed = video_in(WatermarkStatus::Pending, None);
        assert!(job_matches(&claimed, Some("job-1")));
    }

    #[test]
    fn long_errors_are_truncated() {
        assert_eq!(truncate_error(&"e".repeat(5000)).len(), MAX_ERROR_LEN);
        assert_eq!(truncate_error("  boom "), "boom");
    }
}
