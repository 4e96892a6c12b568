//! `mdq folder` – show or set the saved download folder.

use anyhow::Result;
use mdq_core::queue::QueueManager;

pub fn run_folder(manager: &QueueManager, path: Option<String>) -> Result<()> {
    match path {
        Some(path) => {
            manager.set_download_folder(&path)?;
            println!("Download folder set to {path}.");
        }
        None => match manager.download_folder() {
            Some(current) => println!("{current}"),
            None => println!("No download folder saved."),
        },
    }
    Ok(())
}
