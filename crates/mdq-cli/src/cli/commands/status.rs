//! `mdq status` – print the job table.

use mdq_core::queue::QueueManager;

pub fn run_status(manager: &QueueManager) {
    let jobs = manager.jobs();
    if jobs.is_empty() {
        println!("Queue is empty.");
        return;
    }

    println!(
        "{:<6} {:<12} {:>5} {:<6} {:<10} TITLE",
        "ID", "STATUS", "PCT", "FMT", "SIZE"
    );
    for job in &jobs {
        let title = job.title.as_deref().unwrap_or(&job.source_ref);
        let size = job.size_label.as_deref().unwrap_or("-");
        println!(
            "{:<6} {:<12} {:>4.0}% {:<6} {:<10} {}",
            job.id,
            job.status.as_str(),
            job.progress_percent,
            job.format.as_str(),
            size,
            title
        );
        if let Some(err) = &job.last_error {
            println!("       {err}");
        }
    }
}
