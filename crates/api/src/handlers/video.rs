//! Handlers for the `/videos` resource.
//!
//! Uploads go straight from the browser to the bucket: the client asks for
//! an upload URL, PUTs the file, then registers it here. Every lookup is
//! scoped to the caller, so another user's video reads as "not found".

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use saivd_cloud::storage::PresignedUrl;
use saivd_core::error::CoreError;
use saivd_core::types::EntityId;
use saivd_core::validation::{parse_pagination, parse_video_id};
use saivd_core::video::{validate_content_type, validate_file_size, validate_title, video_storage_key};
use saivd_db::models::video::{CreateVideo, Video};
use saivd_db::repositories::{ProfileRepo, VideoRepo};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UploadUrlRequest {
    pub content_type: String,
    pub file_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    /// Id to register the video under once the upload finishes.
    pub video_id: EntityId,
    pub storage_key: String,
    pub upload: PresignedUrl,
}

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub video_id: String,
    pub title: Option<String>,
    pub content_type: String,
    pub file_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct VideoPage {
    pub videos: Vec<Video>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct DownloadUrlResponse {
    pub video_id: EntityId,
    pub download: PresignedUrl,
    /// Set once a watermark job has completed.
    pub watermarked_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/videos?page=&limit=
///
/// The caller's videos, newest first.
pub async fn list_videos(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<VideoPage>>> {
    let page = parse_pagination(params.page.as_deref(), params.limit.as_deref())?;

    let total = VideoRepo::count_for_user(&state.pool, auth_user.user_id).await?;
    let videos =
        VideoRepo::list_for_user(&state.pool, auth_user.user_id, page.limit, page.offset())
            .await?;

    Ok(Json(DataResponse::new(VideoPage {
        videos,
        page: page.page,
        limit: page.limit,
        total,
        total_pages: page.total_pages(total),
    })))
}

/// POST /api/videos/upload-url
pub async fn create_upload_url(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<UploadUrlRequest>,
) -> AppResult<Json<DataResponse<UploadUrlResponse>>> {
    let (content_type, extension) = validate_content_type(&input.content_type)?;
    if let Some(size) = input.file_size {
        validate_file_size(size)?;
    }

    let video_id = Uuid::new_v4();
    let storage_key = video_storage_key(auth_user.user_id, video_id, extension);
    let upload = state.storage.presign_put(&storage_key, content_type).await?;

    Ok(Json(DataResponse::new(UploadUrlResponse {
        video_id,
        storage_key,
        upload,
    })))
}

/// POST /api/videos
///
/// Register an uploaded object. The storage key is derived from the caller
/// and id, never taken from the request.
pub async fn create_video(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<CreateVideoRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Video>>)> {
    let video_id = parse_video_id(&input.video_id)?;
    let (content_type, extension) = validate_content_type(&input.content_type)?;
    let file_size = input.file_size.map(validate_file_size).transpose()?;
    let title = match &input.title {
        Some(raw) => validate_title(raw)?,
        None => None,
    };

    if VideoRepo::find_by_id(&state.pool, video_id).await?.is_some() {
        return Err(CoreError::Conflict("Video is already registered".into()).into());
    }

    let video = VideoRepo::create(
        &state.pool,
        &CreateVideo {
            id: video_id,
            user_id: auth_user.user_id,
            title,
            content_type: content_type.to_string(),
            file_size,
            storage_key: video_storage_key(auth_user.user_id, video_id, extension),
        },
    )
    .await?;
    tracing::info!(user_id = %auth_user.user_id, video_id = %video.id, "Video registered");

    Ok((StatusCode::CREATED, Json(DataResponse::new(video))))
}

/// GET /api/videos/{videoId}
pub async fn get_video(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(video_id): Path<String>,
) -> AppResult<Json<DataResponse<Video>>> {
    let video = find_owned(&state, &auth_user, &video_id).await?;
    Ok(Json(DataResponse::new(video)))
}

/// GET /api/videos/{videoId}/download-url
pub async fn get_download_url(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(video_id): Path<String>,
) -> AppResult<Json<DataResponse<DownloadUrlResponse>>> {
    let video = find_owned(&state, &auth_user, &video_id).await?;
    let download = state.storage.presign_get(&video.storage_key).await?;

    Ok(Json(DataResponse::new(DownloadUrlResponse {
        video_id: video.id,
        download,
        watermarked_url: video.watermarked_url,
    })))
}

/// DELETE /api/videos/{videoId}
///
/// Deletes the row, then removes the object and any queued watermark jobs
/// in the background. Returns 204 No Content.
pub async fn delete_video(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(video_id): Path<String>,
) -> AppResult<StatusCode> {
    let video_id = parse_video_id(&video_id)?;
    // Resolved before the row goes so nothing can fail after the commit.
    let numeric_user_id = ProfileRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .map(|p| p.numeric_user_id);

    let video = VideoRepo::delete_for_owner(&state.pool, video_id, auth_user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Video"))?;
    tracing::info!(user_id = %auth_user.user_id, video_id = %video.id, "Video deleted");

    let storage = state.storage.clone();
    let watermark = state.watermark.clone();
    tokio::spawn(async move {
        if let Err(e) = storage.delete_object(&video.storage_key).await {
            tracing::warn!(key = %video.storage_key, error = %e, "Failed to delete video object");
        }
        if let (Some(client), Some(numeric_user_id)) = (watermark, numeric_user_id) {
            client
                .clear_jobs_for_video(numeric_user_id, &video.id.to_string())
                .await;
        }
    });

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse `raw` and load the caller's video, or 404.
pub(crate) async fn find_owned(
    state: &AppState,
    auth_user: &AuthUser,
    raw: &str,
) -> AppResult<Video> {
    let video_id = parse_video_id(raw)?;
    let video = VideoRepo::find_for_owner(&state.pool, video_id, auth_user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Video"))?;
    Ok(video)
}
