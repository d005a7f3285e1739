//! Video upload rules, storage key layout, and watermark status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::EntityId;

pub const TITLE_MAX_CHARS: usize = 200;

/// 5 GiB, the largest single PUT an S3-compatible store accepts.
pub const MAX_VIDEO_BYTES: i64 = 5 * 1024 * 1024 * 1024;

/// Accepted upload MIME types and the extension stored in the object key.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("video/mp4", "mp4"),
    ("video/quicktime", "mov"),
    ("video/webm", "webm"),
    ("video/x-matroska", "mkv"),
    ("video/x-msvideo", "avi"),
];

/// Object key prefix under which every user's uploads live.
const VIDEO_KEY_PREFIX: &str = "videos";

/// Normalize a MIME type and return it with its file extension.
pub fn validate_content_type(raw: &str) -> Result<(&'static str, &'static str), CoreError> {
    let normalized = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(mime, _)| *mime == normalized)
        .copied()
        .ok_or_else(|| CoreError::validation(format!("Unsupported content type '{raw}'")))
}

pub fn validate_file_size(size: i64) -> Result<i64, CoreError> {
    if size <= 0 || size > MAX_VIDEO_BYTES {
        return Err(CoreError::validation(format!(
            "File size must be between 1 and {MAX_VIDEO_BYTES} bytes"
        )));
    }
    Ok(size)
}

/// Trim a title; empty titles are stored as `NULL`.
pub fn validate_title(raw: &str) -> Result<Option<String>, CoreError> {
    let title = raw.trim();
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(CoreError::validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok((!title.is_empty()).then(|| title.to_string()))
}

/// `videos/{user_id}/{video_id}.{ext}`
pub fn video_storage_key(user_id: EntityId, video_id: EntityId, extension: &str) -> String {
    format!("{VIDEO_KEY_PREFIX}/{user_id}/{video_id}.{extension}")
}

/// Lifecycle of a video's watermark job, mirrored from the external service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkStatus {
    None,
    Pending,
    Processing,
    Completed,
    Error,
}

impl WatermarkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Map a terminal job status reported by the watermark service.
    ///
    /// Only `completed` and `error` are terminal; anything else is `None`.
    pub fn from_job_status(status: &str) -> Option<Self> {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" => Some(Self::Completed),
            "error" | "failed" => Some(Self::Error),
            _ => None,
        }
    }

    /// A job is in flight and a new dispatch would duplicate it.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

impl fmt::Display for WatermarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatermarkStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            other => Err(CoreError::Internal(format!(
                "Unknown watermark status '{other}'"
            ))),
        }
    }
}
