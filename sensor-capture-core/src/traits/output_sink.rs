use crate::models::chunk::CaptureChunk;
use crate::models::error::SinkError;

/// Append-only destination for captured chunks.
///
/// Called from the controller thread only, one chunk at a time, in capture
/// order. A failed append loses that chunk but never ends the session.
pub trait OutputSink: Send {
    /// Append one chunk, taking ownership of it.
    ///
    /// Returns the number of bytes persisted.
    fn append(&mut self, chunk: CaptureChunk) -> Result<usize, SinkError>;

    /// Human-readable name of the destination, for logs.
    fn describe(&self) -> String;
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn append(&mut self, chunk: CaptureChunk) -> Result<usize, SinkError> {
        (**self).append(chunk)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
