//! Repository for the `videos` table.
//!
//! Every owner-facing lookup filters on `user_id` in SQL so a video owned by
//! someone else is indistinguishable from a missing one.

use std::time::Duration;

use sqlx::PgPool;
use saivd_core::types::EntityId;
use saivd_core::video::WatermarkStatus;

use crate::models::video::{CreateVideo, Video, WatermarkResult};

const COLUMNS: &str = "id, user_id, title, content_type, file_size, storage_key, \
                       watermark_status, watermark_job_id, watermarked_url, watermark_error, \
                       upload_date, updated_at";

pub struct VideoRepo;

impl VideoRepo {
    pub async fn create(pool: &PgPool, input: &CreateVideo) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos (id, user_id, title, content_type, file_size, storage_key)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(input.id)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.content_type)
            .bind(input.file_size)
            .bind(&input.storage_key)
            .fetch_one(pool)
            .await
    }

    /// Unscoped lookup, used by the watermark callback.
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_for_owner(
        pool: &PgPool,
        id: EntityId,
        user_id: EntityId,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// One page of a user's videos, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: EntityId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM videos
             WHERE user_id = $1
             ORDER BY upload_date DESC, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_user(pool: &PgPool, user_id: EntityId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM videos WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Delete an owned video, returning the removed row so callers can clean
    /// up its object and watermark jobs.
    pub async fn delete_for_owner(
        pool: &PgPool,
        id: EntityId,
        user_id: EntityId,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("DELETE FROM videos WHERE id = $1 AND user_id = $2 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Move an owned video to `pending` unless a job is already in flight.
    ///
    /// A `pending`/`processing` row counts as in flight until it has gone
    /// `stale_after` without an update, after which it may be claimed again.
    /// Returns `None` when the video is missing, not owned by `user_id`, or
    /// still in flight. Previous results are cleared.
    pub async fn claim_for_watermark(
        pool: &PgPool,
        id: EntityId,
        user_id: EntityId,
        stale_after: Duration,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                watermark_status = 'pending',
                watermark_job_id = NULL,
                watermarked_url = NULL,
                watermark_error = NULL
             WHERE id = $1 AND user_id = $2
               AND (watermark_status NOT IN ('pending', 'processing')
                    OR updated_at < NOW() - make_interval(secs => $3))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(user_id)
            .bind(stale_after.as_secs_f64())
            .fetch_optional(pool)
            .await
    }

    /// Mark a claimed video as `processing` after the service accepted it.
    ///
    /// Only a row still in `pending` is touched, so a callback that already
    /// settled the job is never overwritten. `None` means the row moved on.
    pub async fn set_watermark_job(
        pool: &PgPool,
        id: EntityId,
        job_id: Option<&str>,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET watermark_status = $2, watermark_job_id = $3
             WHERE id = $1 AND watermark_status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(WatermarkStatus::Processing.as_str())
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// Store a terminal watermark outcome for a job that is still in flight.
    ///
    /// Returns `None` when the video is missing or not `pending`/`processing`.
    pub async fn apply_watermark_result(
        pool: &PgPool,
        id: EntityId,
        result: &WatermarkResult,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                watermark_status = $2,
                watermarked_url = $3,
                watermark_error = $4
             WHERE id = $1 AND watermark_status IN ('pending', 'processing')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(result.status.as_str())
            .bind(&result.watermarked_url)
            .bind(&result.error)
            .fetch_optional(pool)
            .await
    }
}
