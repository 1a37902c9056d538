use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// Destination for allocated artifact entries.
pub trait ArchiveSink {
    /// Store `bytes` under `path`. Paths are unique per job.
    fn put(&mut self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Encode the archive into its transferable form.
    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// Deflate-compressed zip archive built in memory.
pub struct ZipArchiveSink {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipArchiveSink {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }
}

impl Default for ZipArchiveSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveSink for ZipArchiveSink {
    fn put(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        self.writer.start_file(path, options)?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}
