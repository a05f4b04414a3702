use thiserror::Error;

use sensor_capture_core::SessionError;

/// Errors that stop the recorder daemon from running at all.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("failed to install signal handlers: {0}")]
    Signals(#[from] std::io::Error),

    #[error("exclaves capture is not available on this platform")]
    UnsupportedPlatform,
}
