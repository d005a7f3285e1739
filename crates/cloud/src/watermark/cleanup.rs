//! Best-effort removal of queued jobs belonging to a deleted video.

use super::{QueueStatus, WatermarkClient};

/// Job ids in `status` whose paired video id equals `video_id`.
///
/// Both sides are trimmed before an exact comparison. Pairs are formed by
/// position and stop at the shorter array; blank job ids are skipped.
pub fn matching_job_ids(status: &QueueStatus, video_id: &str) -> Vec<String> {
    let target = video_id.trim();
    if target.is_empty() {
        return Vec::new();
    }
    let Some(video_ids) = status.video_ids.as_deref() else {
        return Vec::new();
    };

    status
        .job_ids
        .iter()
        .zip(video_ids)
        .filter(|(job_id, vid)| vid.trim() == target && !job_id.trim().is_empty())
        .map(|(job_id, _)| job_id.clone())
        .collect()
}

impl WatermarkClient {
    /// Clear every queued job for `video_id` in one batched request.
    ///
    /// Never fails: every error is logged and the call becomes a no-op.
    /// The status read always completes before the clear is sent.
    pub async fn clear_jobs_for_video(&self, numeric_user_id: i64, video_id: &str) {
        if video_id.trim().is_empty() {
            tracing::debug!(numeric_user_id, "Skipping queue cleanup: empty video id");
            return;
        }

        let status = match self.queue_status(numeric_user_id).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(numeric_user_id, video_id, error = %e, "Failed to read watermark queue");
                return;
            }
        };

        let job_ids = matching_job_ids(&status, video_id);
        if job_ids.is_empty() {
            tracing::debug!(numeric_user_id, video_id, "No queued watermark jobs for video");
            return;
        }

        match self.clear_queue(numeric_user_id, &job_ids).await {
            Ok(()) => tracing::info!(
                numeric_user_id,
                video_id,
                cleared = job_ids.len(),
                "Cleared queued watermark jobs"
            ),
            Err(e) => tracing::warn!(
                numeric_user_id,
                video_id,
                ?job_ids,
                error = %e,
                "Failed to clear watermark queue"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(job_ids: &[&str], video_ids: Option<&[&str]>) -> QueueStatus {
        QueueStatus {
            job_ids: job_ids.iter().map(|s| s.to_string()).collect(),
            video_ids: video_ids.map(|v| v.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn selects_jobs_for_matching_video() {
        let s = status(&["a", "b"], Some(&["v1", "v2"]));
        assert_eq!(matching_job_ids(&s, "v1"), ["a"]);
        assert_eq!(matching_job_ids(&s, " v2 "), ["b"]);
        assert!(matching_job_ids(&s, "v3").is_empty());
    }

    #[test]
    fn collects_every_job_for_a_video() {
        let s = status(&["a", "b", "c"], Some(&["v1", "v2", " v1"]));
        assert_eq!(matching_job_ids(&s, "v1"), ["a", "c"]);
    }

    #[test]
    fn comparison_is_exact_after_trimming() {
        let s = status(&["a"], Some(&["V1"]));
        assert!(matching_job_ids(&s, "v1").is_empty());
    }

    #[test]
    fn unequal_lengths_pair_up_to_shorter() {
        let s = status(&["a", "b", "c"], Some(&["v1"]));
        assert_eq!(matching_job_ids(&s, "v1"), ["a"]);
        let s = status(&["a"], Some(&["v2", "v1"]));
        assert!(matching_job_ids(&s, "v1").is_empty());
    }

    #[test]
    fn missing_video_ids_or_blank_target_match_nothing() {
        assert!(matching_job_ids(&status(&["a"], None), "v1").is_empty());
        assert!(matching_job_ids(&status(&["a"], Some(&["v1"])), "  ").is_empty());
        assert!(matching_job_ids(&status(&[""], Some(&["v1"])), "v1").is_empty());
    }
}
