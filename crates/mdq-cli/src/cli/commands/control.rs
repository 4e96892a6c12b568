//! `mdq cancel | retry | clear` – single-job and cleanup commands.

use mdq_core::job::JobId;
use mdq_core::queue::QueueManager;

// TODO: control socket so cancel can reach a transfer owned by a concurrent
// `mdq run` process; for now only queued snapshot jobs are reachable here
pub async fn run_cancel(manager: &QueueManager, id: JobId) {
    let Some(before) = manager.jobs().iter().find(|j| j.id == id).map(|j| j.status) else {
        println!("No job with id {id}.");
        return;
    };
    manager.cancel(id).await;
    match manager.jobs().iter().find(|j| j.id == id) {
        Some(job) if job.status != before => {
            println!("Job {id} is now {}.", job.status.as_str())
        }
        Some(job) => {
            println!("Job {id} stayed {}.", job.status.as_str());
            if let Some(err) = &job.last_error {
                println!("  {err}");
            }
        }
        None => println!("No job with id {id}."),
    }
}

pub fn run_retry(manager: &QueueManager, id: JobId) {
    if manager.retry(id) {
        println!("Job {id} queued again; run `mdq run` to start it.");
    } else {
        println!("Job {id} cannot be retried.");
    }
}

pub fn run_clear(manager: &QueueManager) {
    let removed = manager.clear_finished();
    println!("Removed {removed} finished job(s).");
}
