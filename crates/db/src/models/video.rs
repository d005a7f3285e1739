//! Video metadata model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use saivd_core::error::CoreError;
use saivd_core::types::{EntityId, Timestamp};
use saivd_core::video::WatermarkStatus;

/// A row from the `videos` table.
///
/// `watermark_status` is stored as text; [`Video::status`] parses it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: EntityId,
    pub user_id: EntityId,
    pub title: Option<String>,
    pub content_type: String,
    pub file_size: Option<i64>,
    pub storage_key: String,
    pub watermark_status: String,
    pub watermark_job_id: Option<String>,
    pub watermarked_url: Option<String>,
    pub watermark_error: Option<String>,
    pub upload_date: Timestamp,
    pub updated_at: Timestamp,
}

impl Video {
    pub fn status(&self) -> Result<WatermarkStatus, CoreError> {
        self.watermark_status.parse()
    }
}

/// DTO for registering an uploaded object.
///
/// The id is chosen when the upload URL is issued, so it is supplied here
/// rather than generated by the database.
#[derive(Debug)]
pub struct CreateVideo {
    pub id: EntityId,
    pub user_id: EntityId,
    pub title: Option<String>,
    pub content_type: String,
    pub file_size: Option<i64>,
    pub storage_key: String,
}

/// Terminal outcome reported for a watermark job.
#[derive(Debug)]
pub struct WatermarkResult {
    pub status: WatermarkStatus,
    pub watermarked_url: Option<String>,
    pub error: Option<String>,
}
