//! Seam to the external media engine.
//!
//! The engine does the actual fetching and transcoding; the queue core only
//! sees this trait plus a multiplexed progress channel keyed by job id.

use async_trait::async_trait;

use crate::job::{JobId, JobStatus, MediaFormat};

/// Raw failure text from the engine, consumed by `classify::classify_failure`.
pub type Diagnostic = String;

/// Everything the engine needs to start one transfer.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub job_id: JobId,
    pub source_ref: String,
    pub destination: String,
    pub format: MediaFormat,
    pub quality: Option<String>,
}

/// Result of a metadata probe.
#[derive(Debug, Clone)]
pub struct MediaMetadata {
    pub title: String,
}

/// Engine's answer to a cancel request. `success` false means the transfer
/// keeps running and `message` explains why it could not be stopped.
#[derive(Debug, Clone)]
pub struct CancelAck {
    pub success: bool,
    pub message: Option<String>,
}

/// Progress report for one job. Events are delivered in non-decreasing
/// completion order on a single channel shared by all jobs.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub job_id: JobId,
    pub percent: f64,
    pub size_label: Option<String>,
    /// Optional in-flight status override (the engine may report post-transfer
    /// processing). Terminal outcomes come from `start_transfer` resolving.
    pub status: Option<JobStatus>,
    pub error: Option<String>,
}

/// Asynchronous interface to the media engine.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Probe the source for a display title. Failures are non-fatal to the job.
    async fn fetch_metadata(&self, source_ref: &str) -> Result<MediaMetadata, Diagnostic>;

    /// Run one transfer to completion. `Err` carries the raw diagnostic.
    async fn start_transfer(&self, request: TransferRequest) -> Result<(), Diagnostic>;

    /// Ask the engine to stop a running transfer.
    async fn cancel_transfer(&self, job_id: JobId) -> CancelAck;
}
