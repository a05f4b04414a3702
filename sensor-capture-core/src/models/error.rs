use thiserror::Error;

use super::handles::SensorStatus;

/// Failure reported by the capability broker for a single platform call.
///
/// `code` is the raw platform return code (`kern_return_t` on Apple targets).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{operation} failed: {code:#x}")]
pub struct BrokerError {
    pub operation: &'static str,
    pub code: i32,
}

impl BrokerError {
    pub const KERN_INVALID_NAME: i32 = 15;
    pub const KERN_INVALID_RIGHT: i32 = 17;
    pub const KERN_INVALID_CAPABILITY: i32 = 20;
    pub const MACH_SEND_INVALID_DEST: i32 = 0x1000_0003;

    pub fn new(operation: &'static str, code: i32) -> Self {
        Self { operation, code }
    }

    /// Whether the code means the handle itself is gone, so retrying the
    /// same call can never succeed.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(
            self.code,
            Self::KERN_INVALID_NAME
                | Self::KERN_INVALID_RIGHT
                | Self::KERN_INVALID_CAPABILITY
                | Self::MACH_SEND_INVALID_DEST
        )
    }
}

/// Failure while acquiring the sensor, the buffer, or destination memory.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("sensor create failed: {0}")]
    SensorCreate(BrokerError),

    #[error("buffer create failed: {0}")]
    BufferCreate(BrokerError),

    #[error("failed to allocate {size} bytes of destination memory")]
    MemoryAllocate { size: usize },
}

/// Failure while waiting for the sensor to become allowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("status query failed: {0}")]
    QueryFailed(BrokerError),

    #[error("cancelled while waiting for authorization")]
    Cancelled,
}

/// Unrecoverable capture failure. Ordinary copy-out failures are retried
/// and never surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("sensor start failed: {0}")]
    StartFailed(BrokerError),

    #[error("sensor start returned {0} instead of allowed")]
    StartRejected(SensorStatus),

    #[error("shared buffer lost: {0}")]
    BufferLost(BrokerError),
}

/// Output sink failure. Always non-fatal to the capture loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("failed to open output: {0}")]
    Open(String),

    #[error("failed to write output: {0}")]
    Write(String),
}

/// Any error that ends or disturbs a capture session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("configuration failed: {0}")]
    Configuration(String),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
