//! End-to-end export job.
//!
//! `Idle -> Running -> {Completed, Failed}`. The job walks the conversation
//! index in order, one conversation at a time with a fixed pause between
//! fetches. A conversation that fails to fetch or process is recorded and
//! skipped. Only an index failure, an empty result, or a failure to encode or
//! save the archive fails the job.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::archive::ArchiveSink;
use crate::conversation::{progress_label, ConversationSummary};
use crate::error::{ExportError, Result};
use crate::paths::PathRegistry;
use crate::processor::process_conversation;
use crate::remote::RemoteSource;

pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// `claude-artifacts-<YYYY-MM-DD>.zip`
pub fn archive_file_name(date: NaiveDate) -> String {
    format!("claude-artifacts-{}.zip", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// 1-based position in the index
    pub current: usize,
    pub total: usize,
    pub conversation_name: String,
}

/// Receives progress notifications. Must not block.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn notify(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Takes the finished archive bytes somewhere the user can reach them.
pub trait Downloader: Send + Sync {
    /// Returns where the archive ended up.
    fn deliver(&self, bytes: &[u8], filename: &str) -> Result<PathBuf>;
}

/// Saves archives into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct FileDownloader {
    dir: PathBuf,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Downloader for FileDownloader {
    fn deliver(&self, bytes: &[u8], filename: &str) -> Result<PathBuf> {
        let path = self.dir.join(filename);
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Transfer {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, bytes).map_err(|source| ExportError::Transfer {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportState {
    Idle,
    Running,
    Completed,
    Failed,
}

impl ExportState {
    fn advance(&mut self, next: ExportState) {
        debug!(from = ?*self, to = ?next, "export state");
        *self = next;
    }
}

/// Terminal outcome of one export job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub succeeded: bool,
    pub artifact_count: usize,
    pub conversations_with_artifacts_count: usize,
    pub total_conversations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
}

impl ExportResult {
    fn failed(err: &ExportError, tally: &Tally) -> Self {
        Self {
            succeeded: false,
            artifact_count: tally.artifacts,
            conversations_with_artifacts_count: tally.conversations_with_artifacts,
            total_conversations: tally.total,
            error_message: Some(err.to_string()),
            saved_to: None,
        }
    }

    fn completed(tally: &Tally, saved_to: PathBuf) -> Self {
        Self {
            succeeded: true,
            artifact_count: tally.artifacts,
            conversations_with_artifacts_count: tally.conversations_with_artifacts,
            total_conversations: tally.total,
            error_message: None,
            saved_to: Some(saved_to),
        }
    }
}

/// What happened to one index entry.
#[derive(Debug)]
pub struct ConversationOutcome {
    pub id: String,
    pub name: String,
    /// Artifacts written, or why the conversation was skipped
    pub result: Result<usize>,
}

#[derive(Debug)]
pub struct ExportReport {
    pub result: ExportResult,
    pub state: ExportState,
    pub outcomes: Vec<ConversationOutcome>,
}

impl ExportReport {
    pub fn failures(&self) -> impl Iterator<Item = &ConversationOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Pause between consecutive conversation fetches
    pub pacing: Duration,
    pub archive_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
            archive_name: archive_file_name(Utc::now().date_naive()),
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    total: usize,
    artifacts: usize,
    conversations_with_artifacts: usize,
}

/// One export run. Owns the path registry and the archive being built;
/// `run` consumes the job, so every job yields exactly one result.
pub struct ExportJob<S, A> {
    source: S,
    archive: A,
    registry: PathRegistry,
    progress: Box<dyn ProgressSink>,
    downloader: Box<dyn Downloader>,
    options: ExportOptions,
    state: ExportState,
}

impl<S: RemoteSource, A: ArchiveSink> ExportJob<S, A> {
    pub fn new(
        source: S,
        archive: A,
        progress: Box<dyn ProgressSink>,
        downloader: Box<dyn Downloader>,
    ) -> Self {
        Self {
            source,
            archive,
            registry: PathRegistry::new(),
            progress,
            downloader,
            options: ExportOptions::default(),
            state: ExportState::Idle,
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    #[instrument(skip_all)]
    pub async fn run(mut self) -> ExportReport {
        self.state.advance(ExportState::Running);
        let mut tally = Tally::default();

        let index = match self.source.fetch_index().await {
            Ok(index) => index,
            Err(err) => {
                let err = ExportError::index_fetch(err);
                return self.fail(err, &tally, Vec::new());
            }
        };

        tally.total = index.len();
        info!(
            conversations = tally.total,
            archive = %self.options.archive_name,
            "fetched conversation index"
        );

        let mut outcomes = Vec::with_capacity(index.len());
        for (idx, summary) in index.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.options.pacing).await;
            }

            let name = progress_label(summary);
            self.progress.notify(&ProgressEvent {
                current: idx + 1,
                total: tally.total,
                conversation_name: name.clone(),
            });

            let result = self.export_one(summary).await;
            match &result {
                Ok(count) => {
                    debug!(conv_id = %summary.id, artifacts = count, "conversation done");
                    tally.artifacts += count;
                    if *count > 0 {
                        tally.conversations_with_artifacts += 1;
                    }
                }
                Err(err) => warn!(conv_id = %summary.id, error = %err, "skipping conversation"),
            }

            outcomes.push(ConversationOutcome {
                id: summary.id.clone(),
                name,
                result,
            });
        }

        if tally.artifacts == 0 {
            let err = ExportError::NoArtifactsFound {
                conversations: tally.total,
            };
            return self.fail(err, &tally, outcomes);
        }

        self.finalize(tally, outcomes)
    }

    async fn export_one(&mut self, summary: &ConversationSummary) -> Result<usize> {
        let conv = self
            .source
            .fetch_full(&summary.id)
            .await
            .map_err(|e| ExportError::conversation_fetch(&summary.id, e))?;

        process_conversation(&conv, &mut self.archive, &mut self.registry)
            .map_err(|e| ExportError::conversation_process(&summary.id, e))
    }

    fn finalize(self, tally: Tally, outcomes: Vec<ConversationOutcome>) -> ExportReport {
        let ExportJob {
            archive,
            downloader,
            options,
            mut state,
            ..
        } = self;

        let delivered = archive
            .finish()
            .map_err(ExportError::archive_finalization)
            .and_then(|bytes| {
                info!(bytes = bytes.len(), "archive finalized");
                downloader.deliver(&bytes, &options.archive_name)
            });

        let result = match delivered {
            Ok(path) => {
                info!(
                    artifacts = tally.artifacts,
                    conversations = tally.conversations_with_artifacts,
                    path = %path.display(),
                    "export completed"
                );
                state.advance(ExportState::Completed);
                ExportResult::completed(&tally, path)
            }
            Err(err) => {
                error!(error = %err, "export failed");
                state.advance(ExportState::Failed);
                ExportResult::failed(&err, &tally)
            }
        };

        ExportReport {
            result,
            state,
            outcomes,
        }
    }

    fn fail(
        mut self,
        err: ExportError,
        tally: &Tally,
        outcomes: Vec<ConversationOutcome>,
    ) -> ExportReport {
        error!(error = %err, "export failed");
        self.state.advance(ExportState::Failed);
        ExportReport {
            result: ExportResult::failed(&err, tally),
            state: self.state,
            outcomes,
        }
    }
}
