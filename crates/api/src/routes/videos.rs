//! Route definitions for the `/videos` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{video, watermark};
use crate::state::AppState;

/// Routes mounted at `/videos`. All require auth.
///
/// ```text
/// GET    /                          -> list_videos
/// POST   /                          -> create_video
/// POST   /upload-url                -> create_upload_url
/// GET    /{video_id}                -> get_video
/// DELETE /{video_id}                -> delete_video
/// GET    /{video_id}/download-url   -> get_download_url
/// POST   /{video_id}/watermark      -> dispatch_watermark
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(video::list_videos).post(video::create_video))
        .route("/upload-url", post(video::create_upload_url))
        .route(
            "/{video_id}",
            get(video::get_video).delete(video::delete_video),
        )
        .route("/{video_id}/download-url", get(video::get_download_url))
        .route("/{video_id}/watermark", post(watermark::dispatch_watermark))
}
