//! Queue persistence: an injectable key-value port and its file-backed impl.
//!
//! The whole queue is written as one JSON snapshot after every mutation
//! (last writer wins). Corrupt or missing data loads as an empty queue; a
//! snapshot is repaired on load so no job appears to still be in flight
//! after a restart.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::job::{Job, JobStatus};

/// Notice stored on jobs whose in-flight work was lost to a restart.
pub const RESTART_NOTICE: &str = "Interrupted by restart; queued again.";

const QUEUE_FILE: &str = "queue.json";
const FOLDER_FILE: &str = "folder";

/// Durable slots for the queue snapshot and the chosen download folder.
///
/// Methods are synchronous: saves happen inside the queue's non-suspending
/// mutation sections, so the port must not yield.
pub trait StatePort: Send + Sync {
    /// Previously saved snapshot, repaired, or empty if absent/corrupt.
    fn load_queue(&self) -> Vec<Job>;

    /// Overwrite the durable slot with the full current snapshot.
    fn save_queue(&self, jobs: &[Job]) -> Result<()>;

    fn load_folder(&self) -> Option<String>;

    fn save_folder(&self, path: &str) -> Result<()>;
}

/// Rewrite statuses that cannot have survived a process restart: any
/// in-flight job becomes queued again with progress reset and a notice.
pub fn repair_loaded(mut jobs: Vec<Job>) -> Vec<Job> {
    for job in &mut jobs {
        if job.status.is_in_flight() {
            tracing::info!(job_id = job.id, status = job.status.as_str(), "repairing in-flight job from snapshot");
            job.status = JobStatus::Queued;
            job.progress_percent = 0.0;
            job.size_label = None;
            job.last_error = Some(RESTART_NOTICE.to_string());
        }
    }
    jobs
}

/// JSON-file implementation of `StatePort` under a state directory
/// (`~/.local/state/mdq` by default).
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: PathBuf) -> Self {
        FileStateStore { dir }
    }

    /// Store under the XDG state dir, creating it if needed.
    pub fn open_default() -> Result<Self> {
        let dir = xdg::BaseDirectories::with_prefix("mdq")?.get_state_home();
        fs::create_dir_all(&dir).with_context(|| format!("creating state dir {}", dir.display()))?;
        Ok(FileStateStore { dir })
    }

    fn queue_path(&self) -> PathBuf {
        self.dir.join(QUEUE_FILE)
    }

    fn folder_path(&self) -> PathBuf {
        self.dir.join(FOLDER_FILE)
    }
}

impl StatePort for FileStateStore {
    fn load_queue(&self) -> Vec<Job> {
        let path = self.queue_path();
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %err, "queue snapshot unreadable; starting empty");
                }
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Job>>(&data) {
            Ok(jobs) => repair_loaded(jobs),
            Err(err) => {
                // Corrupt state is discarded, not surfaced.
                tracing::warn!(path = %path.display(), error = %err, "queue snapshot corrupt; starting empty");
                Vec::new()
            }
        }
    }

    fn save_queue(&self, jobs: &[Job]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let data = serde_json::to_string_pretty(jobs)?;
        fs::write(self.queue_path(), data)
            .with_context(|| format!("writing {}", self.queue_path().display()))?;
        Ok(())
    }

    fn load_folder(&self) -> Option<String> {
        let folder = fs::read_to_string(self.folder_path()).ok()?;
        let folder = folder.trim();
        if folder.is_empty() {
            None
        } else {
            Some(folder.to_string())
        }
    }

    fn save_folder(&self, path: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.folder_path(), path)
            .with_context(|| format!("writing {}", self.folder_path().display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Job, MediaFormat};

    fn store() -> (tempfile::TempDir, FileStateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    fn job(id: u64, status: JobStatus) -> Job {
        let mut j =
            Job::new(id, "https://example.com/v", MediaFormat::Video, Some("720".into()), "/tmp")
                .unwrap();
        j.status = status;
        j
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let (_dir, store) = store();
        assert!(store.load_queue().is_empty());
    }

    #[test]
    fn corrupt_snapshot_loads_empty() {
        let (_dir, store) = store();
        fs::write(store.queue_path(), "{not json").unwrap();
        assert!(store.load_queue().is_empty());
    }

    #[test]
    fn snapshot_roundtrip_preserves_order_and_fields() {
        let (_dir, store) = store();
        let mut a = job(1, JobStatus::Completed);
        a.title = Some("First".into());
        a.progress_percent = 100.0;
        let b = job(2, JobStatus::Queued);
        store.save_queue(&[a, b]).unwrap();

        let loaded = store.load_queue();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, 1);
        assert_eq!(loaded[0].status, JobStatus::Completed);
        assert_eq!(loaded[0].title.as_deref(), Some("First"));
        assert_eq!(loaded[0].progress_percent, 100.0);
        assert_eq!(loaded[1].id, 2);
        assert_eq!(loaded[1].status, JobStatus::Queued);
    }

    #[test]
    fn in_flight_jobs_repaired_on_load() {
        let (_dir, store) = store();
        let mut running = job(1, JobStatus::Downloading);
        running.progress_percent = 55.0;
        running.size_label = Some("10 MiB".into());
        store.save_queue(&[running, job(2, JobStatus::Fetching), job(3, JobStatus::Processing)])
            .unwrap();

        let loaded = store.load_queue();
        for j in &loaded {
            assert_eq!(j.status, JobStatus::Queued);
            assert_eq!(j.progress_percent, 0.0);
            assert!(j.size_label.is_none());
            assert_eq!(j.last_error.as_deref(), Some(RESTART_NOTICE));
        }
    }

    #[test]
    fn terminal_and_queued_jobs_load_untouched() {
        let (_dir, store) = store();
        let mut failed = job(1, JobStatus::Failed);
        failed.last_error = Some("Too many requests. Please wait and try again.".into());
        store.save_queue(&[failed, job(2, JobStatus::Queued)]).unwrap();

        let loaded = store.load_queue();
        assert_eq!(loaded[0].status, JobStatus::Failed);
        assert_eq!(
            loaded[0].last_error.as_deref(),
            Some("Too many requests. Please wait and try again.")
        );
        assert_eq!(loaded[1].status, JobStatus::Queued);
        assert!(loaded[1].last_error.is_none());
    }

    #[test]
    fn folder_slot_roundtrip() {
        let (_dir, store) = store();
        assert!(store.load_folder().is_none());
        store.save_folder("/home/user/Downloads").unwrap();
        assert_eq!(store.load_folder().as_deref(), Some("/home/user/Downloads"));
    }
}
