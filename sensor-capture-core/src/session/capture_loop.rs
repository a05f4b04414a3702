use std::thread;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::models::chunk::CaptureChunk;
use crate::models::error::{BrokerError, CaptureError};
use crate::models::handles::{BufferHandle, CopyRegion};
use crate::models::session_report::CaptureStats;
use crate::session::cancellation::CancellationToken;
use crate::traits::capability_broker::CapabilityBroker;
use crate::traits::lifecycle_delegate::LifecycleDelegate;
use crate::traits::output_sink::OutputSink;

/// Copies the shared buffer into destination memory until cancelled.
///
/// Data flow per iteration:
/// ```text
/// [shared buffer] → copy_out → [destination] → CaptureChunk → [OutputSink]
///                                                   ↓
///                                         hex preview → log / delegate
/// ```
pub struct CaptureLoop<'a, B: CapabilityBroker + ?Sized> {
    broker: &'a B,
    buffer: BufferHandle,
    destination: &'a mut [u8],
    interval: Duration,
    preview_len: usize,
    delegate: Option<&'a dyn LifecycleDelegate>,
    stats: CaptureStats,
    next_sequence: u64,
    hasher: Sha256,
}

impl<'a, B: CapabilityBroker + ?Sized> CaptureLoop<'a, B> {
    pub fn new(
        broker: &'a B,
        buffer: BufferHandle,
        destination: &'a mut [u8],
        interval: Duration,
        preview_len: usize,
    ) -> Self {
        Self {
            broker,
            buffer,
            destination,
            interval,
            preview_len,
            delegate: None,
            stats: CaptureStats::default(),
            next_sequence: 0,
            hasher: Sha256::new(),
        }
    }

    pub fn with_delegate(mut self, delegate: Option<&'a dyn LifecycleDelegate>) -> Self {
        self.delegate = delegate;
        self
    }

    /// Consume the loop, returning its counters and the SHA-256 hex digest
    /// of every byte the sink accepted.
    pub fn finish(self) -> (CaptureStats, String) {
        (self.stats, hex_encode(&self.hasher.finalize()))
    }

    /// Run until `cancel` is observed at the top of an iteration.
    ///
    /// Copy-out failures are logged and retried on the next iteration.
    /// Only a copy-out failing because the buffer handle is gone ends the
    /// loop with an error.
    pub fn run<S: OutputSink + ?Sized>(
        &mut self,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> Result<(), CaptureError> {
        log::info!("Entering capture loop, writing to {}", sink.describe());

        while !cancel.is_cancelled() {
            match self.copy_once() {
                Ok(chunk) => self.deliver(chunk, sink),
                Err(e) if e.is_invalid_handle() => {
                    log::error!("Shared buffer is gone, leaving capture loop: {}", e);
                    return Err(CaptureError::BufferLost(e));
                }
                Err(e) => {
                    self.stats.copy_failures += 1;
                    log::error!("Buffer copy-out failed: {}", e);
                }
            }

            thread::sleep(self.interval);
        }

        log::info!(
            "Left capture loop after {} chunks ({} copy failures, {} sink failures)",
            self.stats.chunks_delivered,
            self.stats.copy_failures,
            self.stats.sink_failures
        );
        Ok(())
    }

    fn copy_once(&mut self) -> Result<CaptureChunk, BrokerError> {
        let size = self.destination.len();
        self.broker.copy_out(
            self.buffer,
            &mut *self.destination,
            CopyRegion::whole(size),
            CopyRegion::EMPTY,
        )?;

        let chunk = CaptureChunk::new(self.next_sequence, self.destination.to_vec());
        self.next_sequence += 1;
        Ok(chunk)
    }

    fn deliver<S: OutputSink + ?Sized>(&mut self, chunk: CaptureChunk, sink: &mut S) {
        let sequence = chunk.sequence();
        let preview = chunk.preview(self.preview_len);
        log::debug!("Copied chunk {} ({} bytes)", sequence, chunk.len());
        log::debug!("First {} bytes: {}", self.preview_len.min(chunk.len()), preview);

        let mut hasher = self.hasher.clone();
        hasher.update(chunk.data());
        match sink.append(chunk) {
            Ok(written) => {
                self.hasher = hasher;
                self.stats.chunks_delivered += 1;
                self.stats.bytes_written += written as u64;
                if let Some(delegate) = self.delegate {
                    delegate.on_chunk_captured(sequence, &preview);
                }
            }
            Err(e) => {
                self.stats.sink_failures += 1;
                log::error!("Dropping chunk {}: {}", sequence, e);
            }
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
