/// Structured error types for artifactctl-core.
///
/// The base variants describe what went wrong at the transport, decode or
/// storage level. The wrapping variants (`IndexFetch`, `ConversationFetch`,
/// ...) record which phase of an export job the failure happened in, which is
/// what decides whether the job keeps going or stops.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for artifactctl-core operations
#[derive(Error, Debug)]
pub enum ExportError {
    /// Transport-level HTTP failure (connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("remote request to {url} failed with status {status}")]
    RemoteStatus { url: String, status: u16 },

    /// JSON parsing failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Archive library failure
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Conversation id not present in the source
    #[error("conversation {id} not found")]
    ConversationNotFound { id: String },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// The conversation index could not be retrieved
    #[error("failed to fetch conversation index: {source}")]
    IndexFetch { source: Box<ExportError> },

    /// A single conversation could not be retrieved
    #[error("failed to fetch conversation {id}: {source}")]
    ConversationFetch {
        id: String,
        source: Box<ExportError>,
    },

    /// A single conversation could not be written to the archive
    #[error("failed to process conversation {id}: {source}")]
    ConversationProcess {
        id: String,
        source: Box<ExportError>,
    },

    /// Every conversation was visited but none contained artifacts
    #[error("no artifacts found in {conversations} conversation(s)")]
    NoArtifactsFound { conversations: usize },

    /// The archive could not be encoded
    #[error("failed to finalize archive: {source}")]
    ArchiveFinalization { source: Box<ExportError> },

    /// The encoded archive could not be handed to the save target
    #[error("failed to save archive to {path:?}: {source}")]
    Transfer { path: PathBuf, source: io::Error },
}

/// Result type alias for artifactctl-core operations
pub type Result<T> = std::result::Result<T, ExportError>;

impl ExportError {
    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a remote status error
    pub fn remote_status(url: impl Into<String>, status: u16) -> Self {
        Self::RemoteStatus {
            url: url.into(),
            status,
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn index_fetch(source: ExportError) -> Self {
        Self::IndexFetch {
            source: Box::new(source),
        }
    }

    pub fn conversation_fetch(id: impl Into<String>, source: ExportError) -> Self {
        Self::ConversationFetch {
            id: id.into(),
            source: Box::new(source),
        }
    }

    pub fn conversation_process(id: impl Into<String>, source: ExportError) -> Self {
        Self::ConversationProcess {
            id: id.into(),
            source: Box::new(source),
        }
    }

    pub fn archive_finalization(source: ExportError) -> Self {
        Self::ArchiveFinalization {
            source: Box::new(source),
        }
    }

    /// HTTP status carried by this error, looking through phase wrappers
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteStatus { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::IndexFetch { source }
            | Self::ConversationFetch { source, .. }
            | Self::ConversationProcess { source, .. }
            | Self::ArchiveFinalization { source } => source.status(),
            _ => None,
        }
    }
}
