//! QR code images linking to public profiles.

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;
use saivd_core::error::CoreError;
use saivd_core::qr::{profile_url, qr_storage_key, render_qr_png};
use saivd_core::validation::parse_user_id;
use saivd_db::repositories::ProfileRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const PNG_CONTENT_TYPE: &str = "image/png";
const QR_CACHE_CONTROL: &str = "public, max-age=86400";

/// GET /profile/{userId}/qr
///
/// Serve the cached PNG from the object store, rendering and caching it on
/// first request. A cache read or write failure still returns the image.
pub async fn get_profile_qr(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&user_id)?;
    ProfileRepo::find_public_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User"))?;

    let key = qr_storage_key(user_id);
    let cached = match state.storage.get_object(&key).await {
        Ok(cached) => cached,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "QR cache read failed, regenerating");
            None
        }
    };

    let png = match cached {
        Some(png) => png,
        None => {
            let url = profile_url(&state.config.public_base_url, user_id);
            let png = tokio::task::spawn_blocking(move || render_qr_png(&url))
                .await
                .map_err(|e| AppError::InternalError(format!("QR render task failed: {e}")))??;

            if let Err(e) = state
                .storage
                .put_object(&key, png.clone(), PNG_CONTENT_TYPE)
                .await
            {
                tracing::warn!(key = %key, error = %e, "Failed to cache QR code");
            }
            png
        }
    };

    Ok((
        [(CONTENT_TYPE, PNG_CONTENT_TYPE), (CACHE_CONTROL, QR_CACHE_CONTROL)],
        png,
    ))
}
