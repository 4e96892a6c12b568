//! Job records and the status state machine.
//!
//! A `Job` is one download request; its `status` moves only along the
//! transitions allowed by `JobStatus::can_transition`, enforced by the
//! store's `set_status`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Job identifier. Monotonically increasing per process, never reused.
pub type JobId = u64;

/// Requested output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Audio,
    Video,
}

impl MediaFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaFormat::Audio => "audio",
            MediaFormat::Video => "video",
        }
    }
}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Fetching,
    Downloading,
    Processing,
    Completed,
    Failed,
    Canceled,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Fetching => "fetching",
            JobStatus::Downloading => "downloading",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
        }
    }

    /// Completed, failed, or canceled. A job leaves a terminal status only via retry.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Canceled
        )
    }

    /// Fetching, downloading, or processing: work that cannot survive a restart.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            JobStatus::Fetching | JobStatus::Downloading | JobStatus::Processing
        )
    }

    /// Legality table for status transitions. A same-status "transition" is
    /// allowed so progress events that repeat the current status are harmless.
    pub fn can_transition(self, to: JobStatus) -> bool {
        use JobStatus::*;
        if self == to {
            return true;
        }
        match self {
            Queued => matches!(to, Fetching | Canceled),
            Fetching => matches!(to, Downloading | Processing | Canceled),
            Downloading => matches!(to, Processing | Completed | Failed | Canceled),
            Processing => matches!(to, Downloading | Completed | Failed | Canceled),
            // Retry re-initializes failed/canceled jobs to queued.
            Failed | Canceled => matches!(to, Queued),
            Completed => false,
        }
    }
}

/// Validation failure when constructing a job from request parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobSpecError {
    #[error("source reference must not be empty")]
    EmptySourceRef,
    #[error("destination must not be empty")]
    EmptyDestination,
    #[error("quality is required for video downloads")]
    MissingQuality,
    #[error("quality is only valid for video downloads")]
    UnexpectedQuality,
}

/// One queued/in-progress/finished download request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub source_ref: String,
    pub format: MediaFormat,
    /// Present if and only if `format` is video.
    pub quality: Option<String>,
    pub destination: String,
    pub status: JobStatus,
    pub progress_percent: f64,
    pub size_label: Option<String>,
    pub title: Option<String>,
    pub last_error: Option<String>,
}

impl Job {
    /// Build a new queued job, validating the quality-iff-video rule and
    /// non-empty source/destination.
    pub fn new(
        id: JobId,
        source_ref: &str,
        format: MediaFormat,
        quality: Option<String>,
        destination: &str,
    ) -> Result<Self, JobSpecError> {
        if source_ref.trim().is_empty() {
            return Err(JobSpecError::EmptySourceRef);
        }
        if destination.trim().is_empty() {
            return Err(JobSpecError::EmptyDestination);
        }
        match (format, &quality) {
            (MediaFormat::Video, None) => return Err(JobSpecError::MissingQuality),
            (MediaFormat::Audio, Some(_)) => return Err(JobSpecError::UnexpectedQuality),
            _ => {}
        }
        Ok(Job {
            id,
            source_ref: source_ref.to_string(),
            format,
            quality,
            destination: destination.to_string(),
            status: JobStatus::Queued,
            progress_percent: 0.0,
            size_label: None,
            title: None,
            last_error: None,
        })
    }
}

/// Normalize a progress percentage into [0, 100]; non-finite values become 0.
pub fn clamp_percent(p: f64) -> f64 {
    if !p.is_finite() {
        return 0.0;
    }
    p.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_job() -> Job {
        Job::new(1, "https://example.com/v", MediaFormat::Video, Some("720".into()), "/tmp").unwrap()
    }

    #[test]
    fn new_job_starts_queued_and_clean() {
        let j = video_job();
        assert_eq!(j.status, JobStatus::Queued);
        assert_eq!(j.progress_percent, 0.0);
        assert!(j.title.is_none());
        assert!(j.last_error.is_none());
    }

    #[test]
    fn quality_required_iff_video() {
        assert_eq!(
            Job::new(1, "https://a.com/x", MediaFormat::Video, None, "/tmp").unwrap_err(),
            JobSpecError::MissingQuality
        );
        assert_eq!(
            Job::new(1, "https://a.com/x", MediaFormat::Audio, Some("720".into()), "/tmp")
                .unwrap_err(),
            JobSpecError::UnexpectedQuality
        );
        assert!(Job::new(1, "https://a.com/x", MediaFormat::Audio, None, "/tmp").is_ok());
    }

    #[test]
    fn empty_fields_rejected() {
        assert_eq!(
            Job::new(1, "  ", MediaFormat::Audio, None, "/tmp").unwrap_err(),
            JobSpecError::EmptySourceRef
        );
        assert_eq!(
            Job::new(1, "https://a.com/x", MediaFormat::Audio, None, "").unwrap_err(),
            JobSpecError::EmptyDestination
        );
    }

    #[test]
    fn clamp_percent_normalizes() {
        assert_eq!(clamp_percent(137.0), 100.0);
        assert_eq!(clamp_percent(-5.0), 0.0);
        assert_eq!(clamp_percent(42.5), 42.5);
        assert_eq!(clamp_percent(f64::NAN), 0.0);
        assert_eq!(clamp_percent(f64::INFINITY), 0.0);
    }

    #[test]
    fn transition_table() {
        use JobStatus::*;
        assert!(Queued.can_transition(Fetching));
        assert!(Queued.can_transition(Canceled));
        assert!(!Queued.can_transition(Downloading));
        assert!(Fetching.can_transition(Downloading));
        assert!(Fetching.can_transition(Canceled));
        assert!(Downloading.can_transition(Processing));
        assert!(Downloading.can_transition(Completed));
        assert!(Downloading.can_transition(Failed));
        assert!(Processing.can_transition(Completed));
        assert!(Failed.can_transition(Queued));
        assert!(Canceled.can_transition(Queued));
        assert!(!Completed.can_transition(Queued));
        assert!(!Completed.can_transition(Failed));
        // progress events may repeat the current status
        assert!(Downloading.can_transition(Downloading));
    }

    #[test]
    fn terminal_and_in_flight_sets() {
        use JobStatus::*;
        for s in [Completed, Failed, Canceled] {
            assert!(s.is_terminal());
            assert!(!s.is_in_flight());
        }
        for s in [Fetching, Downloading, Processing] {
            assert!(s.is_in_flight());
            assert!(!s.is_terminal());
        }
        assert!(!Queued.is_terminal());
        assert!(!Queued.is_in_flight());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&JobStatus::Downloading).unwrap(), "\"downloading\"");
        assert_eq!(serde_json::to_string(&MediaFormat::Video).unwrap(), "\"video\"");
        let s: JobStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(s, JobStatus::Canceled);
    }
}
