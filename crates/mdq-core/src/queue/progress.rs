//! Progress event consumption.

use tokio::sync::mpsc;

use super::QueueManager;
use crate::executor::ProgressEvent;
use crate::job::clamp_percent;

impl QueueManager {
    /// Spawn a task that applies engine progress events until the channel
    /// closes. All jobs share one channel; events carry the job id.
    pub fn spawn_progress_consumer(
        &self,
        mut rx: mpsc::Receiver<ProgressEvent>,
    ) -> tokio::task::JoinHandle<()> {
        let mgr = self.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                mgr.apply_progress(event);
            }
        })
    }

    /// Fold one progress event into its job. Events for unknown or settled
    /// jobs are dropped, and an event can only move a job between in-flight
    /// statuses; terminal outcomes come from the transfer call resolving.
    pub fn apply_progress(&self, event: ProgressEvent) {
        let mut st = self.state();
        let Some(job) = st.store.get(event.job_id) else { return };
        if !job.status.is_in_flight() {
            return;
        }
        if let Some(status) = event.status {
            if status.is_in_flight() {
                st.store.set_status(event.job_id, status);
            }
        }
        let Some(job) = st.store.get_mut(event.job_id) else { return };
        job.progress_percent = clamp_percent(event.percent);
        if let Some(size) = event.size_label {
            job.size_label = Some(size);
        }
        if let Some(error) = event.error {
            if !error.is_empty() {
                job.last_error = Some(error);
            }
        }
        self.persist(&st);
    }
}
