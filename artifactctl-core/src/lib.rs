pub mod archive;
pub mod artifacts;
pub mod config;
pub mod conversation;
pub mod error;
pub mod export;
pub mod paths;
pub mod processor;
pub mod remote;
#[cfg(test)]
mod testing;

pub use archive::{ArchiveSink, ZipArchiveSink};
pub use artifacts::{extract, Artifact};
pub use config::ExportConfig;
pub use conversation::{
    normalize, ConversationFull, ConversationSummary, Message, MessageBody, Sender,
};
pub use error::{ExportError, Result};
pub use export::{
    archive_file_name, Downloader, ExportJob, ExportOptions, ExportReport, ExportResult,
    ExportState, FileDownloader, ProgressEvent, ProgressSink,
};
pub use paths::PathRegistry;
pub use processor::process_conversation;
pub use remote::{ClaudeClient, HttpRemoteSource, LocalSource, Organization, RemoteSource};
