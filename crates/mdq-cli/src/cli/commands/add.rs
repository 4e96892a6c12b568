//! `mdq add <urls...>` – submit download requests.

use anyhow::{bail, Context, Result};
use mdq_core::job::MediaFormat;
use mdq_core::queue::QueueManager;

pub fn run_add(
    manager: &QueueManager,
    urls: &[String],
    format: MediaFormat,
    quality: Option<String>,
    dest: Option<String>,
) -> Result<()> {
    let Some(destination) = dest.or_else(|| manager.download_folder()) else {
        bail!("no destination given and no download folder saved; run `mdq folder <PATH>` first");
    };
    // video needs a quality; audio ignores one
    let quality = match format {
        MediaFormat::Video => Some(quality.unwrap_or_else(|| "720".to_string())),
        MediaFormat::Audio => None,
    };

    let raw = urls.join("\n");
    let outcome = manager
        .submit(&raw, format, quality, &destination)
        .context("submission rejected")?;
    println!(
        "Added {} job(s) ({} invalid, {} duplicate).",
        outcome.accepted, outcome.invalid_syntax, outcome.duplicate
    );
    Ok(())
}
