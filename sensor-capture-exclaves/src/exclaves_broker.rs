//! Exclaves capability broker.
//!
//! Opens the sensor and its audio buffer through the exclaves calls and
//! releases both by deallocating their Mach port names.

use std::ffi::CString;

use sensor_capture_core::{
    BrokerError, BufferHandle, CapabilityBroker, CopyRegion, SensorHandle, SensorStatus,
};

use crate::ffi;

/// Broker backed by the exclaves sensor and audio buffer calls.
#[derive(Debug, Default)]
pub struct ExclavesBroker;

impl ExclavesBroker {
    pub fn new() -> Self {
        Self
    }
}

fn check(operation: &'static str, kr: ffi::kern_return_t) -> Result<(), BrokerError> {
    if kr == ffi::KERN_SUCCESS {
        Ok(())
    } else {
        Err(BrokerError::new(operation, kr))
    }
}

fn c_name(operation: &'static str, name: &str) -> Result<CString, BrokerError> {
    CString::new(name).map_err(|_| BrokerError::new(operation, ffi::KERN_INVALID_ARGUMENT))
}

fn deallocate(port: ffi::mach_port_t) {
    // SAFETY: plain Mach call on a port name this process owns.
    let kr = unsafe { ffi::mach_port_deallocate(ffi::mach_task_self(), port) };
    if kr != ffi::KERN_SUCCESS {
        log::warn!("mach_port_deallocate({:#x}) failed: {:#x}", port, kr);
    }
}

impl CapabilityBroker for ExclavesBroker {
    fn create_sensor(&self, name: &str) -> Result<SensorHandle, BrokerError> {
        const OP: &str = "exclaves_sensor_create";
        let name = c_name(OP, name)?;
        let mut port = ffi::MACH_PORT_NULL;
        // SAFETY: `name` is NUL-terminated and outlives the call; `port` is
        // a valid out pointer.
        let kr = unsafe { ffi::exclaves_sensor_create(ffi::MACH_PORT_NULL, name.as_ptr(), &mut port) };
        check(OP, kr)?;
        Ok(SensorHandle::from_raw(port))
    }

    fn create_buffer(&self, name: &str, size: usize) -> Result<BufferHandle, BrokerError> {
        const OP: &str = "exclaves_audio_buffer_create";
        let name = c_name(OP, name)?;
        let mut port = ffi::MACH_PORT_NULL;
        // SAFETY: as for `create_sensor`.
        let kr = unsafe {
            ffi::exclaves_audio_buffer_create(
                ffi::MACH_PORT_NULL,
                name.as_ptr(),
                size as ffi::mach_vm_size_t,
                &mut port,
            )
        };
        check(OP, kr)?;
        Ok(BufferHandle::from_raw(port))
    }

    fn query_status(&self, sensor: SensorHandle) -> Result<SensorStatus, BrokerError> {
        let mut status: ffi::exclaves_sensor_status_t = 0;
        // SAFETY: `status` is a valid out pointer.
        let kr = unsafe { ffi::exclaves_sensor_status(sensor.raw(), 0, &mut status) };
        check("exclaves_sensor_status", kr)?;
        Ok(SensorStatus::from_raw(status))
    }

    fn start(&self, sensor: SensorHandle) -> Result<SensorStatus, BrokerError> {
        let mut status: ffi::exclaves_sensor_status_t = 0;
        // SAFETY: `status` is a valid out pointer.
        let kr = unsafe { ffi::exclaves_sensor_start(sensor.raw(), 0, &mut status) };
        check("exclaves_sensor_start", kr)?;
        Ok(SensorStatus::from_raw(status))
    }

    fn stop(&self, sensor: SensorHandle) -> Result<SensorStatus, BrokerError> {
        let mut status: ffi::exclaves_sensor_status_t = 0;
        // SAFETY: `status` is a valid out pointer.
        let kr = unsafe { ffi::exclaves_sensor_stop(sensor.raw(), 0, &mut status) };
        check("exclaves_sensor_stop", kr)?;
        Ok(SensorStatus::from_raw(status))
    }

    fn copy_out(
        &self,
        buffer: BufferHandle,
        destination: &mut [u8],
        primary: CopyRegion,
        wrap: CopyRegion,
    ) -> Result<(), BrokerError> {
        const OP: &str = "exclaves_audio_buffer_copyout";
        let requested = primary.size.saturating_add(wrap.size);
        if requested > destination.len() as u64 {
            return Err(BrokerError::new(OP, ffi::KERN_INVALID_ARGUMENT));
        }
        // SAFETY: the kernel writes at most `primary.size + wrap.size`
        // bytes, which fits in `destination` as checked above.
        let kr = unsafe {
            ffi::exclaves_audio_buffer_copyout(
                buffer.raw(),
                destination.as_mut_ptr() as ffi::mach_vm_address_t,
                primary.size,
                primary.offset,
                wrap.size,
                wrap.offset,
            )
        };
        check(OP, kr)
    }

    fn destroy_sensor(&self, sensor: SensorHandle) {
        deallocate(sensor.raw());
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        deallocate(buffer.raw());
    }
}
