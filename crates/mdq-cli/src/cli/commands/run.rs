//! `mdq run` – start queued jobs and wait for the queue to drain.

use std::time::Duration;

use mdq_core::executor::ProgressEvent;
use mdq_core::job::JobStatus;
use mdq_core::queue::QueueManager;
use tokio::sync::mpsc;

pub async fn run_queue(manager: &QueueManager, progress_rx: mpsc::Receiver<ProgressEvent>) {
    let queued = manager
        .jobs()
        .iter()
        .filter(|j| j.status == JobStatus::Queued)
        .count();
    if queued == 0 {
        println!("No queued jobs.");
        return;
    }

    manager.spawn_progress_consumer(progress_rx);
    println!("Starting {queued} job(s)...");
    manager.start_all();

    while !manager.is_idle() {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    let jobs = manager.jobs();
    let completed = jobs.iter().filter(|j| j.status == JobStatus::Completed).count();
    let failed = jobs.iter().filter(|j| j.status == JobStatus::Failed).count();
    let canceled = jobs.iter().filter(|j| j.status == JobStatus::Canceled).count();
    println!("Done: {completed} completed, {failed} failed, {canceled} canceled.");
    for job in jobs.iter().filter(|j| j.status == JobStatus::Failed) {
        let reason = job.last_error.as_deref().unwrap_or("Unknown error occurred.");
        println!("  #{} {}", job.id, reason);
    }
}
