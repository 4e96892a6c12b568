//! Executor backed by an external engine command.
//!
//! The actual fetching/transcoding engine stays outside the process; this
//! adapter expands the configured command templates, spawns the engine with
//! `tokio::process`, forwards percentage tokens from its output as progress
//! events, and kills the child on cancel.

use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use mdq_core::executor::{
    CancelAck, Diagnostic, Executor, MediaMetadata, ProgressEvent, TransferRequest,
};
use mdq_core::job::JobId;

/// Expand a command template into (program, args). Placeholders like `{url}`
/// are substituted; a token left empty by substitution is dropped, so
/// `{quality}` disappears cleanly for audio requests.
fn expand_template(
    template: &str,
    vars: &[(&str, &str)],
) -> Result<(String, Vec<String>), Diagnostic> {
    let mut parts = Vec::new();
    for token in template.split_whitespace() {
        let mut token = token.to_string();
        for (name, value) in vars {
            token = token.replace(&format!("{{{name}}}"), value);
        }
        if !token.is_empty() {
            parts.push(token);
        }
    }
    let mut parts = parts.into_iter();
    let program = parts.next().ok_or_else(|| "empty command template".to_string())?;
    Ok((program, parts.collect()))
}

/// Pull a percentage, and the size following "of" when present, out of one
/// engine output line, e.g. `[download]  42.3% of ~ 10.4MiB at 1.2MiB/s`.
fn parse_progress(line: &str) -> Option<(f64, Option<String>)> {
    let mut tokens = line.split_whitespace();
    let percent = tokens
        .by_ref()
        .find_map(|t| t.strip_suffix('%').and_then(|n| n.parse::<f64>().ok()))?;
    let mut size_label = None;
    while let Some(token) = tokens.next() {
        if token == "of" {
            let mut next = tokens.next();
            if next == Some("~") {
                next = tokens.next();
            }
            size_label = next.map(str::to_string);
            break;
        }
    }
    Some((percent, size_label))
}

/// Last non-empty lines of the engine's stderr, for the failure diagnostic.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let start = lines.len().saturating_sub(3);
    lines[start..].join("\n")
}

pub struct CommandExecutor {
    metadata_command: String,
    transfer_command: String,
    progress_tx: mpsc::Sender<ProgressEvent>,
    children: Mutex<HashMap<JobId, Child>>,
    canceled: Mutex<HashSet<JobId>>,
}

impl CommandExecutor {
    /// Build the executor and the progress channel its transfers feed.
    pub fn new(
        metadata_command: String,
        transfer_command: String,
    ) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (progress_tx, progress_rx) = mpsc::channel(64);
        (
            CommandExecutor {
                metadata_command,
                transfer_command,
                progress_tx,
                children: Mutex::new(HashMap::new()),
                canceled: Mutex::new(HashSet::new()),
            },
            progress_rx,
        )
    }
}

#[async_trait]
impl Executor for CommandExecutor {
    async fn fetch_metadata(&self, source_ref: &str) -> Result<MediaMetadata, Diagnostic> {
        let (program, args) = expand_template(&self.metadata_command, &[("url", source_ref)])?;
        let output = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| format!("failed to run {program}: {e}"))?;
        if !output.status.success() {
            return Err(stderr_tail(&String::from_utf8_lossy(&output.stderr)));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let title = stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| "engine printed no title".to_string())?;
        Ok(MediaMetadata { title: title.to_string() })
    }

    async fn start_transfer(&self, request: TransferRequest) -> Result<(), Diagnostic> {
        let job_id = request.job_id;
        let vars = [
            ("url", request.source_ref.as_str()),
            ("dest", request.destination.as_str()),
            ("format", request.format.as_str()),
            ("quality", request.quality.as_deref().unwrap_or("")),
        ];
        let (program, args) = expand_template(&self.transfer_command, &vars)?;
        tracing::debug!(job_id, program, "spawning engine");
        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to spawn {program}: {e}"))?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        self.children.lock().unwrap().insert(job_id, child);

        let tx = self.progress_tx.clone();
        let stdout_task = async move {
            if let Some(out) = stdout {
                let mut lines = BufReader::new(out).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if let Some((percent, size_label)) = parse_progress(&line) {
                        let _ = tx
                            .send(ProgressEvent {
                                job_id,
                                percent,
                                size_label,
                                status: None,
                                error: None,
                            })
                            .await;
                    }
                }
            }
        };
        let stderr_task = async move {
            let mut buf = String::new();
            if let Some(mut err) = stderr {
                let _ = err.read_to_string(&mut buf).await;
            }
            buf
        };
        let ((), stderr_text) = tokio::join!(stdout_task, stderr_task);

        // streams are closed; reap the child
        let child = self.children.lock().unwrap().remove(&job_id);
        let Some(mut child) = child else {
            return Err("canceled by user".to_string());
        };
        let status = child.wait().await.map_err(|e| e.to_string())?;
        let was_canceled = self.canceled.lock().unwrap().remove(&job_id);

        if was_canceled {
            Err("canceled by user".to_string())
        } else if status.success() {
            Ok(())
        } else {
            let tail = stderr_tail(&stderr_text);
            if tail.is_empty() {
                Err(format!("engine exited with {status}"))
            } else {
                Err(tail)
            }
        }
    }

    async fn cancel_transfer(&self, job_id: JobId) -> CancelAck {
        let mut children = self.children.lock().unwrap();
        match children.get_mut(&job_id) {
            Some(child) => match child.start_kill() {
                Ok(()) => {
                    self.canceled.lock().unwrap().insert(job_id);
                    CancelAck { success: true, message: None }
                }
                Err(err) => CancelAck {
                    success: false,
                    message: Some(format!("failed to stop transfer: {err}")),
                },
            },
            None => CancelAck {
                success: false,
                message: Some("no running transfer for this job".to_string()),
            },
        }
    }
}
