//! Batch submission: syntax validation, dedup, append.

use thiserror::Error;
use url::Url;

use super::QueueManager;
use crate::job::{Job, MediaFormat};
use crate::store::DedupKey;

/// Per-line feedback for one submission batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub accepted: usize,
    pub invalid_syntax: usize,
    pub duplicate: usize,
}

/// Validation failure that rejects a whole batch with no state mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("no download folder selected")]
    MissingDestination,
    #[error("no sources given")]
    EmptySourceList,
    #[error("quality is required for video downloads")]
    MissingQuality,
}

impl QueueManager {
    /// Validate and enqueue a batch of source references, one per line.
    ///
    /// Lines are trimmed and blank lines dropped. Audio submissions discard
    /// any quality value; video submissions require one. Dedup is checked
    /// against live stored jobs and earlier lines of the same batch.
    pub fn submit(
        &self,
        raw_text: &str,
        format: MediaFormat,
        quality: Option<String>,
        destination: &str,
    ) -> Result<SubmitOutcome, SubmitError> {
        if destination.trim().is_empty() {
            return Err(SubmitError::MissingDestination);
        }
        let lines: Vec<&str> = raw_text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(SubmitError::EmptySourceList);
        }
        let quality = match format {
            MediaFormat::Video => Some(quality.ok_or(SubmitError::MissingQuality)?),
            MediaFormat::Audio => None,
        };

        let mut outcome = SubmitOutcome::default();
        let mut st = self.state();
        for line in lines {
            if Url::parse(line).is_err() {
                outcome.invalid_syntax += 1;
                continue;
            }
            // add() claims the key immediately, so earlier batch lines are
            // covered by the same check as stored jobs
            let key = DedupKey::new(line, format, quality.as_deref(), destination);
            if st.store.has_live_key(&key) {
                outcome.duplicate += 1;
                continue;
            }
            let id = st.next_id;
            let Ok(job) = Job::new(id, line, format, quality.clone(), destination) else {
                outcome.invalid_syntax += 1;
                continue;
            };
            match st.store.add(job) {
                Ok(_) => {
                    st.next_id += 1;
                    outcome.accepted += 1;
                }
                Err(_) => outcome.duplicate += 1,
            }
        }
        if outcome.accepted > 0 {
            self.persist(&st);
        }
        tracing::info!(
            accepted = outcome.accepted,
            invalid = outcome.invalid_syntax,
            duplicate = outcome.duplicate,
            "batch submitted"
        );
        Ok(outcome)
    }
}
