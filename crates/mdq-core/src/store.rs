//! In-memory job store and dedup index.
//!
//! The store is the single owner of job records: insertion order is kept for
//! FIFO dispatch, and a set of dedup keys over live (non-terminal) jobs
//! rejects duplicate requests. Status changes go through `set_status` so the
//! key set stays consistent with terminal transitions and retries.

use crate::job::{Job, JobId, JobStatus, MediaFormat};

/// Composite identity of a request: (source, format, quality-or-empty, destination).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    source_ref: String,
    format: MediaFormat,
    quality: String,
    destination: String,
}

impl DedupKey {
    pub fn new(
        source_ref: &str,
        format: MediaFormat,
        quality: Option<&str>,
        destination: &str,
    ) -> Self {
        DedupKey {
            source_ref: source_ref.to_string(),
            format,
            quality: quality.unwrap_or("").to_string(),
            destination: destination.to_string(),
        }
    }

    pub fn of(job: &Job) -> Self {
        DedupKey::new(
            &job.source_ref,
            job.format,
            job.quality.as_deref(),
            &job.destination,
        )
    }
}

/// Ordered collection of jobs plus the live dedup key set.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Vec<Job>,
    live_keys: std::collections::HashSet<DedupKey>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job, claiming its dedup key. Returns the rejected candidate
    /// if an equivalent live job already exists.
    pub fn add(&mut self, job: Job) -> Result<JobId, Job> {
        let key = DedupKey::of(&job);
        if !job.status.is_terminal() && !self.live_keys.insert(key) {
            return Err(job);
        }
        let id = job.id;
        self.jobs.push(job);
        Ok(id)
    }

    /// Reinsert a job from a persisted snapshot without duplicate rejection.
    /// Snapshot contents were themselves deduplicated when first enqueued.
    pub fn restore(&mut self, job: Job) {
        if !job.status.is_terminal() {
            self.live_keys.insert(DedupKey::of(&job));
        }
        self.jobs.push(job);
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.id == id)
    }

    /// Apply a status transition, keeping the dedup index in sync: entering a
    /// terminal status frees the job's key, leaving one (retry) re-claims it.
    /// Returns false (and changes nothing) for unknown ids, illegal moves,
    /// and re-queues whose key a live job holds in the meantime.
    pub fn set_status(&mut self, id: JobId, to: JobStatus) -> bool {
        let Some(idx) = self.jobs.iter().position(|j| j.id == id) else {
            return false;
        };
        let from = self.jobs[idx].status;
        if !from.can_transition(to) {
            tracing::warn!(job_id = id, from = from.as_str(), to = to.as_str(), "illegal status transition refused");
            return false;
        }
        if from != to {
            let key = DedupKey::of(&self.jobs[idx]);
            if !from.is_terminal() && to.is_terminal() {
                self.live_keys.remove(&key);
            } else if from.is_terminal() && !to.is_terminal() && !self.live_keys.insert(key) {
                tracing::warn!(job_id = id, "re-queue refused, the dedup key is held by a live job");
                return false;
            }
        }
        self.jobs[idx].status = to;
        true
    }

    /// True if a live (non-terminal) job already claims this key.
    pub fn has_live_key(&self, key: &DedupKey) -> bool {
        self.live_keys.contains(key)
    }

    /// Remove all jobs matching the predicate, dropping their live keys.
    /// Returns the number removed.
    pub fn remove_where<F: Fn(&Job) -> bool>(&mut self, pred: F) -> usize {
        let before = self.jobs.len();
        let mut removed_live = Vec::new();
        self.jobs.retain(|j| {
            if pred(j) {
                if !j.status.is_terminal() {
                    removed_live.push(DedupKey::of(j));
                }
                false
            } else {
                true
            }
        });
        for key in removed_live {
            self.live_keys.remove(&key);
        }
        before - self.jobs.len()
    }

    /// Lazy, order-preserving view of jobs with the given status.
    pub fn iter_with_status(&self, status: JobStatus) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(move |j| j.status == status)
    }

    /// All jobs in insertion order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
