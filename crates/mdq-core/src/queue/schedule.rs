//! Bounded-concurrency dispatch and the per-job lifecycle drive.

use super::QueueManager;
use crate::classify::classify_failure;
use crate::executor::TransferRequest;
use crate::job::{JobId, JobStatus};

impl QueueManager {
    /// Start processing the queue. Alias for `schedule`, named for the UI.
    pub fn start_all(&self) {
        self.schedule();
    }

    /// Fill free slots with the earliest queued jobs, FIFO. Idempotent and
    /// safe to call repeatedly; invoked again on every slot release.
    pub fn schedule(&self) {
        loop {
            let Some(job_id) = self.dispatch_next() else { break };
            let mgr = self.clone();
            tokio::spawn(async move { mgr.drive(job_id).await });
        }
    }

    /// Claim a slot for the earliest queued job and move it to fetching.
    /// Returns None when no queued job remains or the slot budget is spent.
    /// Only a queued job can start, which guards against double dispatch.
    fn dispatch_next(&self) -> Option<JobId> {
        let mut st = self.state();
        if st.active_slots >= self.max_concurrent {
            return None;
        }
        let id = st
            .store
            .iter_with_status(JobStatus::Queued)
            .map(|j| j.id)
            .next()?;
        if !st.store.set_status(id, JobStatus::Fetching) {
            return None;
        }
        st.active_slots += 1;
        tracing::debug!(job_id = id, active = st.active_slots, "job dispatched");
        self.persist(&st);
        Some(id)
    }

    /// Free one slot and immediately reuse the capacity. Called exactly once
    /// per dispatch, when the drive settles or a mid-flight cancel lands.
    pub(super) fn release_slot(&self) {
        {
            let mut st = self.state();
            st.active_slots = st.active_slots.saturating_sub(1);
        }
        self.schedule();
    }

    /// Drive one dispatched job: metadata probe, cancellation checkpoint,
    /// transfer, terminal bookkeeping.
    pub(super) async fn drive(&self, job_id: JobId) {
        let source_ref = {
            let st = self.state();
            st.store.get(job_id).map(|j| j.source_ref.clone())
        };
        let Some(source_ref) = source_ref else {
            // a dispatched job is only removed after a terminal transition,
            // and the path that made it terminal released the slot
            return;
        };

        // a failed probe is absorbed; the source ref stands in for the title
        let title = match self.executor().fetch_metadata(&source_ref).await {
            Ok(meta) => meta.title,
            Err(err) => {
                tracing::debug!(job_id, error = %err, "metadata probe failed, using source ref as title");
                source_ref.clone()
            }
        };

        let request = {
            let mut st = self.state();
            if let Some(job) = st.store.get_mut(job_id) {
                job.title = Some(title);
            }
            // cancellation requested during the probe takes effect now
            if st.pending_cancel.remove(&job_id) {
                st.store.set_status(job_id, JobStatus::Canceled);
                tracing::info!(job_id, "job canceled after metadata probe");
                self.persist(&st);
                drop(st);
                self.release_slot();
                return;
            }
            st.store.set_status(job_id, JobStatus::Downloading);
            let Some(job) = st.store.get(job_id) else {
                // removed jobs went terminal first; their slot is gone
                return;
            };
            let request = TransferRequest {
                job_id,
                source_ref: job.source_ref.clone(),
                destination: job.destination.clone(),
                format: job.format,
                quality: job.quality.clone(),
            };
            self.persist(&st);
            request
        };

        let result = self.executor().start_transfer(request).await;

        {
            let mut st = self.state();
            let Some(job) = st.store.get(job_id) else {
                // canceled mid-flight and then cleared; the cancel path
                // already released the slot
                return;
            };
            if job.status.is_terminal() {
                // canceled out from under the transfer; the cancel path
                // already released the slot
                return;
            }
            match result {
                Ok(()) => {
                    st.store.set_status(job_id, JobStatus::Completed);
                    if let Some(job) = st.store.get_mut(job_id) {
                        job.progress_percent = 100.0;
                    }
                    tracing::info!(job_id, "transfer completed");
                }
                Err(diag) => {
                    let message = classify_failure(Some(&diag));
                    st.store.set_status(job_id, JobStatus::Failed);
                    if let Some(job) = st.store.get_mut(job_id) {
                        job.last_error = Some(message.to_string());
                    }
                    tracing::warn!(job_id, diagnostic = %diag, message, "transfer failed");
                }
            }
            self.persist(&st);
        }
        self.release_slot();
    }
}
