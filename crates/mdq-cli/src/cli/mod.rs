//! CLI for the MDQ media download queue.

mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;

use mdq_core::config;
use mdq_core::job::MediaFormat;
use mdq_core::persist::FileStateStore;
use mdq_core::queue::QueueManager;

use crate::exec::CommandExecutor;
use commands::{run_add, run_cancel, run_clear, run_folder, run_queue, run_retry, run_status};

/// Output format for submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Audio,
    Video,
}

impl From<FormatArg> for MediaFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Audio => MediaFormat::Audio,
            FormatArg::Video => MediaFormat::Video,
        }
    }
}

/// Top-level CLI for the MDQ download queue.
#[derive(Debug, Parser)]
#[command(name = "mdq")]
#[command(about = "MDQ: queue manager for media downloads", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Add download requests to the queue.
    Add {
        /// Source URLs, one job each.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output format.
        #[arg(long, value_enum, default_value = "video")]
        format: FormatArg,

        /// Video quality, e.g. 720. Required for video, ignored for audio.
        #[arg(long)]
        quality: Option<String>,

        /// Destination folder; defaults to the saved download folder.
        #[arg(long)]
        dest: Option<String>,
    },

    /// Start queued jobs and run until the queue drains.
    Run,

    /// Show all jobs in the queue.
    Status,

    /// Cancel a job by its id.
    ///
    /// Active transfers belong to the `mdq run` process; a separate
    /// invocation only reaches jobs the snapshot shows as queued.
    Cancel {
        /// Job identifier.
        id: u64,
    },

    /// Re-queue a failed or canceled job by its id.
    Retry {
        /// Job identifier.
        id: u64,
    },

    /// Remove all completed, failed, and canceled jobs.
    Clear,

    /// Show or set the saved download folder.
    Folder {
        /// New download folder; omit to show the current one.
        path: Option<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let (executor, progress_rx) =
            CommandExecutor::new(cfg.metadata_command.clone(), cfg.transfer_command.clone());
        let port = Arc::new(FileStateStore::open_default()?);
        let manager = QueueManager::new(Arc::new(executor), port, cfg.max_concurrent);
        manager.restore();

        match cli.command {
            CliCommand::Add { urls, format, quality, dest } => {
                run_add(&manager, &urls, format.into(), quality, dest)?
            }
            CliCommand::Run => run_queue(&manager, progress_rx).await,
            CliCommand::Status => run_status(&manager),
            CliCommand::Cancel { id } => run_cancel(&manager, id).await,
            CliCommand::Retry { id } => run_retry(&manager, id),
            CliCommand::Clear => run_clear(&manager),
            CliCommand::Folder { path } => run_folder(&manager, path)?,
        }

        Ok(())
    }
}
