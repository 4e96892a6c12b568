//! The queue manager service object.
//!
//! Owns the job store, dedup index, pending-cancellation set, and slot
//! counter behind one mutex; lifecycle drives are spawned tasks that lock
//! only between engine calls, so every mutation section runs without
//! suspension and the full snapshot is persisted before the lock drops.

mod control;
mod progress;
mod schedule;
mod submit;


pub use submit::{SubmitError, SubmitOutcome};

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;

use crate::executor::Executor;
use crate::job::{Job, JobId, JobStatus};
use crate::persist::StatePort;
use crate::store::JobStore;

pub(crate) struct QueueState {
    pub(crate) store: JobStore,
    pub(crate) pending_cancel: HashSet<JobId>,
    pub(crate) active_slots: usize,
    pub(crate) next_id: JobId,
}

/// Handle to the queue. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct QueueManager {
    inner: Arc<Mutex<QueueState>>,
    executor: Arc<dyn Executor>,
    port: Arc<dyn StatePort>,
    max_concurrent: usize,
}

impl QueueManager {
    pub fn new(
        executor: Arc<dyn Executor>,
        port: Arc<dyn StatePort>,
        max_concurrent: usize,
    ) -> Self {
        QueueManager {
            inner: Arc::new(Mutex::new(QueueState {
                store: JobStore::new(),
                pending_cancel: HashSet::new(),
                active_slots: 0,
                next_id: 1,
            })),
            executor,
            port,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, QueueState> {
        self.inner.lock().unwrap()
    }

    pub(crate) fn executor(&self) -> &dyn Executor {
        self.executor.as_ref()
    }

    /// Write the full snapshot through the persistence port. A failed save is
    /// logged and does not abort the mutation that triggered it.
    pub(crate) fn persist(&self, state: &QueueState) {
        if let Err(err) = self.port.save_queue(state.store.jobs()) {
            tracing::warn!(error = %err, "queue snapshot save failed");
        }
    }

    /// Load the persisted snapshot (already repaired by the port) into the
    /// store and advance the id counter past every restored id. Call once at
    /// startup, before any submission.
    pub fn restore(&self) {
        let loaded = self.port.load_queue();
        if loaded.is_empty() {
            return;
        }
        let mut st = self.state();
        for job in loaded {
            st.next_id = st.next_id.max(job.id + 1);
            st.store.restore(job);
        }
        tracing::info!(jobs = st.store.len(), "queue restored from snapshot");
        // write the repaired statuses back
        self.persist(&st);
    }

    /// Ordered read model of all jobs.
    pub fn jobs(&self) -> Vec<Job> {
        self.state().store.jobs().to_vec()
    }

    /// Number of jobs currently holding an active slot.
    pub fn active_slots(&self) -> usize {
        self.state().active_slots
    }

    /// True when no job is active and none is waiting.
    pub fn is_idle(&self) -> bool {
        let st = self.state();
        st.active_slots == 0 && st.store.iter_with_status(JobStatus::Queued).next().is_none()
    }

    pub fn download_folder(&self) -> Option<String> {
        self.port.load_folder()
    }

    pub fn set_download_folder(&self, path: &str) -> Result<()> {
        self.port.save_folder(path)
    }
}
