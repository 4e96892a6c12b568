//! Cancellation, retry, and bulk clear.

use super::QueueManager;
use crate::job::{JobId, JobStatus};

enum CancelPlan {
    /// Handled locally (or flagged), nothing more to do.
    Done,
    /// The transfer is active; ask the engine to stop it.
    Remote,
}

impl QueueManager {
    /// Request cancellation of a job. Cooperative and phase-dependent: a
    /// queued job cancels locally, one inside the metadata probe is flagged
    /// and canceled at the next checkpoint, an active transfer is canceled
    /// through the engine, which may refuse.
    pub async fn cancel(&self, job_id: JobId) {
        let plan = {
            let mut st = self.state();
            let Some(job) = st.store.get(job_id) else { return };
            match job.status {
                JobStatus::Queued => {
                    // never held a slot, so no capacity to give back
                    st.store.set_status(job_id, JobStatus::Canceled);
                    tracing::info!(job_id, "queued job canceled");
                    self.persist(&st);
                    CancelPlan::Done
                }
                JobStatus::Fetching => {
                    st.pending_cancel.insert(job_id);
                    tracing::debug!(job_id, "cancellation pending until metadata probe resolves");
                    CancelPlan::Done
                }
                JobStatus::Downloading | JobStatus::Processing => CancelPlan::Remote,
                _ => return,
            }
        };
        if matches!(plan, CancelPlan::Done) {
            return;
        }

        let ack = self.executor().cancel_transfer(job_id).await;
        let released = {
            let mut st = self.state();
            let Some(job) = st.store.get(job_id) else { return };
            if !ack.success {
                // cancel did not take effect; keep the status, surface why
                let reason = ack
                    .message
                    .unwrap_or_else(|| "Cancel request was refused.".to_string());
                tracing::warn!(job_id, reason, "transfer cancel refused");
                if let Some(job) = st.store.get_mut(job_id) {
                    job.last_error = Some(reason);
                }
                self.persist(&st);
                false
            } else if job.status.is_terminal() {
                // transfer settled while the cancel was in flight; its drive
                // already released the slot
                false
            } else {
                st.store.set_status(job_id, JobStatus::Canceled);
                tracing::info!(job_id, "transfer canceled");
                self.persist(&st);
                true
            }
        };
        if released {
            self.release_slot();
        }
    }

    /// Re-queue a failed or canceled job, making it eligible for the
    /// scheduler again. Any other status is a no-op. Returns true if the job
    /// was re-queued.
    pub fn retry(&self, job_id: JobId) -> bool {
        let mut st = self.state();
        let Some(job) = st.store.get(job_id) else { return false };
        if !matches!(job.status, JobStatus::Failed | JobStatus::Canceled) {
            return false;
        }
        // the store refuses the re-queue if an equivalent request went live
        // after this one settled
        if !st.store.set_status(job_id, JobStatus::Queued) {
            return false;
        }
        if let Some(job) = st.store.get_mut(job_id) {
            job.progress_percent = 0.0;
            job.size_label = None;
            job.last_error = None;
        }
        st.pending_cancel.remove(&job_id);
        tracing::info!(job_id, "job re-queued");
        self.persist(&st);
        true
    }

    /// Remove every completed, failed, and canceled job. Returns the count.
    pub fn clear_finished(&self) -> usize {
        let mut st = self.state();
        let removed = st.store.remove_where(|j| j.status.is_terminal());
        if removed > 0 {
            tracing::info!(removed, "finished jobs cleared");
            self.persist(&st);
        }
        removed
    }
}
