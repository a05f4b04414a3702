use crate::models::error::BrokerError;
use crate::models::handles::{BufferHandle, CopyRegion, SensorHandle, SensorStatus};

/// Platform service that creates and destroys sensor and buffer handles.
///
/// Implemented by:
/// - `ExclavesBroker` (Apple exclaves sensor and audio buffer calls)
/// - the call-counting mock used by this crate's tests
///
/// Every method may be called from the controller thread only; the broker
/// is shared behind an `Arc` so that diagnostics can outlive a session.
pub trait CapabilityBroker: Send + Sync {
    /// Open a sensor session by name.
    fn create_sensor(&self, name: &str) -> Result<SensorHandle, BrokerError>;

    /// Open a shared buffer session of `size` bytes by name.
    fn create_buffer(&self, name: &str, size: usize) -> Result<BufferHandle, BrokerError>;

    /// Report the current sensor status.
    ///
    /// A successful call reporting `Denied` is not an error.
    fn query_status(&self, sensor: SensorHandle) -> Result<SensorStatus, BrokerError>;

    /// Start the sensor. Succeeds only when it reports `Allowed`.
    fn start(&self, sensor: SensorHandle) -> Result<SensorStatus, BrokerError>;

    /// Stop the sensor. Best effort; release continues on failure.
    fn stop(&self, sensor: SensorHandle) -> Result<SensorStatus, BrokerError>;

    /// Copy buffer contents into `destination`.
    ///
    /// `primary` and `wrap` describe the two regions of the shared ring;
    /// an empty `wrap` copies a single contiguous region.
    fn copy_out(
        &self,
        buffer: BufferHandle,
        destination: &mut [u8],
        primary: CopyRegion,
        wrap: CopyRegion,
    ) -> Result<(), BrokerError>;

    /// Destroy a sensor handle. Failures are logged by the implementation.
    fn destroy_sensor(&self, sensor: SensorHandle);

    /// Destroy a buffer handle. Failures are logged by the implementation.
    fn destroy_buffer(&self, buffer: BufferHandle);
}
