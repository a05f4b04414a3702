use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::models::chunk::CaptureChunk;
use crate::models::error::SinkError;
use crate::traits::output_sink::OutputSink;

/// Append-only file sink.
///
/// The file is opened for append before every chunk and closed right after,
/// so nothing stays open between iterations and an external rotation of the
/// file is picked up on the next write.
///
/// ## File Format
///
/// ```text
/// [chunk 0 raw bytes][chunk 1 raw bytes]...
/// ```
///
/// No header or framing: chunks are appended verbatim.
#[derive(Debug, Clone)]
pub struct AppendFileSink {
    path: PathBuf,
    total_bytes_written: u64,
}

impl AppendFileSink {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            total_bytes_written: 0,
        }
    }

    pub fn total_bytes_written(&self) -> u64 {
        self.total_bytes_written
    }
}

impl OutputSink for AppendFileSink {
    fn append(&mut self, chunk: CaptureChunk) -> Result<usize, SinkError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SinkError::Open(format!("{}: {}", self.path.display(), e)))?;

        file.write_all(chunk.data())
            .map_err(|e| SinkError::Write(format!("{}: {}", self.path.display(), e)))?;

        self.total_bytes_written += chunk.len() as u64;
        Ok(chunk.len())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
