use std::sync::Arc;

use crate::models::config::SessionConfiguration;
use crate::models::error::AcquisitionError;
use crate::models::handles::{BufferHandle, SensorHandle};
use crate::traits::capability_broker::CapabilityBroker;

/// Live sensor handle. Stops (if started) and destroys the sensor on drop.
struct SensorLease<B: CapabilityBroker> {
    broker: Arc<B>,
    handle: SensorHandle,
    started: bool,
}

impl<B: CapabilityBroker> Drop for SensorLease<B> {
    fn drop(&mut self) {
        if self.started {
            if let Err(e) = self.broker.stop(self.handle) {
                log::warn!("Stopping {} failed, destroying anyway: {}", self.handle, e);
            }
        }
        self.broker.destroy_sensor(self.handle);
        log::debug!("Destroyed {}", self.handle);
    }
}

/// Live buffer handle. Destroys the buffer on drop.
struct BufferLease<B: CapabilityBroker> {
    broker: Arc<B>,
    handle: BufferHandle,
}

impl<B: CapabilityBroker> Drop for BufferLease<B> {
    fn drop(&mut self) {
        self.broker.destroy_buffer(self.handle);
        log::debug!("Destroyed {}", self.handle);
    }
}

/// Owner of the sensor handle, the buffer handle and the destination memory.
///
/// Acquisition is all-or-nothing: on failure, everything acquired so far is
/// released before the error is returned. Release is idempotent and also
/// runs on drop, so no exit path can leak a handle.
pub struct ResourceGuard<B: CapabilityBroker> {
    broker: Arc<B>,
    sensor: Option<SensorLease<B>>,
    buffer: Option<BufferLease<B>>,
    destination: Option<Vec<u8>>,
}

impl<B: CapabilityBroker> ResourceGuard<B> {
    pub fn new(broker: Arc<B>) -> Self {
        Self {
            broker,
            sensor: None,
            buffer: None,
            destination: None,
        }
    }

    /// Acquire sensor, buffer and destination memory, in that order.
    ///
    /// Any resources still held from an earlier acquisition are released
    /// first.
    pub fn acquire(
        &mut self,
        config: &SessionConfiguration,
    ) -> Result<(SensorHandle, BufferHandle), AcquisitionError> {
        if self.is_acquired() {
            log::warn!("Resource guard still held resources; releasing before reacquiring");
            self.release();
        }

        let sensor_handle = self.broker.create_sensor(&config.sensor_name).map_err(|e| {
            log::error!("Sensor create failed: {}", e);
            AcquisitionError::SensorCreate(e)
        })?;
        let sensor = SensorLease {
            broker: Arc::clone(&self.broker),
            handle: sensor_handle,
            started: false,
        };
        log::info!("Sensor created: {}", sensor_handle);

        // From here on, an early return drops `sensor` (and `buffer`),
        // which destroys them in reverse order of creation.
        let buffer_handle = self
            .broker
            .create_buffer(&config.buffer_name, config.buffer_size)
            .map_err(|e| {
                log::error!("Buffer create failed: {}", e);
                AcquisitionError::BufferCreate(e)
            })?;
        let buffer = BufferLease {
            broker: Arc::clone(&self.broker),
            handle: buffer_handle,
        };
        log::info!("Buffer created: {}", buffer_handle);

        let destination = allocate_destination(config.buffer_size)?;
        log::info!("Allocated {} bytes of local memory", config.buffer_size);

        self.sensor = Some(sensor);
        self.buffer = Some(buffer);
        self.destination = Some(destination);
        Ok((sensor_handle, buffer_handle))
    }

    /// Release destination memory, buffer and sensor.
    ///
    /// Each resource is released independently and invalidated immediately.
    /// Returns whether anything was released.
    pub fn release(&mut self) -> bool {
        let mut released = false;
        if self.destination.take().is_some() {
            released = true;
        }
        if self.buffer.take().is_some() {
            released = true;
        }
        if self.sensor.take().is_some() {
            released = true;
        }
        if released {
            log::info!("Sensor stopped and memory cleaned up");
        }
        released
    }

    pub fn is_acquired(&self) -> bool {
        self.sensor.is_some() || self.buffer.is_some() || self.destination.is_some()
    }

    pub fn sensor_handle(&self) -> Option<SensorHandle> {
        self.sensor.as_ref().map(|s| s.handle)
    }

    pub fn buffer_handle(&self) -> Option<BufferHandle> {
        self.buffer.as_ref().map(|b| b.handle)
    }

    /// Record that the sensor was started, so release stops it first.
    pub fn mark_started(&mut self) {
        if let Some(sensor) = self.sensor.as_mut() {
            sensor.started = true;
        }
    }

    pub fn destination_mut(&mut self) -> Option<&mut [u8]> {
        self.destination.as_deref_mut()
    }
}

impl<B: CapabilityBroker> Drop for ResourceGuard<B> {
    fn drop(&mut self) {
        self.release();
    }
}

fn allocate_destination(size: usize) -> Result<Vec<u8>, AcquisitionError> {
    let mut destination = Vec::new();
    destination.try_reserve_exact(size).map_err(|_| {
        log::error!("Allocating {} bytes of local memory failed", size);
        AcquisitionError::MemoryAllocate { size }
    })?;
    destination.resize(size, 0);
    Ok(destination)
}
