//! In-memory stand-ins for the job's collaborators.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use crate::archive::ArchiveSink;
use crate::conversation::{ConversationFull, ConversationSummary};
use crate::error::{ExportError, Result};
use crate::export::{Downloader, ProgressEvent, ProgressSink};
use crate::remote::RemoteSource;

#[derive(Debug, Default)]
pub struct MemoryArchive {
    entries: Vec<(String, Vec<u8>)>,
    fail_put: bool,
    fail_finish: bool,
}

impl MemoryArchive {
    pub fn failing() -> Self {
        Self {
            fail_put: true,
            ..Self::default()
        }
    }

    pub fn failing_finish() -> Self {
        Self {
            fail_finish: true,
            ..Self::default()
        }
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|(p, _)| p.as_str()).collect()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .and_then(|(_, bytes)| std::str::from_utf8(bytes).ok())
    }
}

impl ArchiveSink for MemoryArchive {
    fn put(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        if self.fail_put {
            return Err(std::io::Error::other("disk full").into());
        }
        self.entries.push((path.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        if self.fail_finish {
            return Err(std::io::Error::other("encoder gave up").into());
        }
        Ok(self.paths().join("\n").into_bytes())
    }
}

/// Index and conversations served from memory; selected ids fail.
#[derive(Default)]
pub struct ScriptedSource {
    index: Vec<ConversationSummary>,
    conversations: HashMap<String, ConversationFull>,
    failures: HashMap<String, u16>,
    index_error: Option<u16>,
}

impl ScriptedSource {
    pub fn conversation(mut self, value: Value) -> Self {
        let conv: ConversationFull = serde_json::from_value(value).expect("test conversation");
        self.index.push(conv.summary());
        self.conversations.insert(conv.id.clone(), conv);
        self
    }

    pub fn failing(mut self, id: &str, name: &str, status: u16) -> Self {
        self.index.push(ConversationSummary {
            id: id.to_string(),
            display_name: Some(name.to_string()),
        });
        self.failures.insert(id.to_string(), status);
        self
    }

    pub fn index_error(mut self, status: u16) -> Self {
        self.index_error = Some(status);
        self
    }
}

#[async_trait]
impl RemoteSource for ScriptedSource {
    async fn fetch_index(&self) -> Result<Vec<ConversationSummary>> {
        match self.index_error {
            Some(status) => Err(ExportError::remote_status("scripted://index", status)),
            None => Ok(self.index.clone()),
        }
    }

    async fn fetch_full(&self, id: &str) -> Result<ConversationFull> {
        if let Some(status) = self.failures.get(id) {
            return Err(ExportError::remote_status(format!("scripted://{id}"), *status));
        }
        self.conversations
            .get(id)
            .cloned()
            .ok_or_else(|| ExportError::ConversationNotFound { id: id.to_string() })
    }
}

#[derive(Clone, Default)]
pub struct RecordingProgress {
    events: Arc<Mutex<Vec<(ProgressEvent, Instant)>>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn instants(&self) -> Vec<Instant> {
        self.events.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn notify(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push((event.clone(), Instant::now()));
    }
}

#[derive(Clone, Default)]
pub struct RecordingDownloader {
    delivered: Arc<Mutex<Option<(Vec<u8>, String)>>>,
    fail: bool,
}

impl RecordingDownloader {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Option<(Vec<u8>, String)> {
        self.delivered.lock().unwrap().clone()
    }
}

impl Downloader for RecordingDownloader {
    fn deliver(&self, bytes: &[u8], filename: &str) -> Result<PathBuf> {
        if self.fail {
            return Err(ExportError::Transfer {
                path: PathBuf::from(filename),
                source: std::io::Error::other("read-only"),
            });
        }
        *self.delivered.lock().unwrap() = Some((bytes.to_vec(), filename.to_string()));
        Ok(PathBuf::from(filename))
    }
}
