//! Raw bindings to the exclaves sensor / audio buffer calls and the Mach
//! port calls needed to release them.

#![allow(non_camel_case_types)]

use std::os::raw::c_char;

pub type kern_return_t = i32;
pub type mach_port_t = u32;
pub type mach_vm_address_t = u64;
pub type mach_vm_size_t = u64;
pub type exclaves_sensor_status_t = u32;

pub const KERN_SUCCESS: kern_return_t = 0;
pub const KERN_INVALID_ARGUMENT: kern_return_t = 4;
pub const MACH_PORT_NULL: mach_port_t = 0;

extern "C" {
    static mach_task_self_: mach_port_t;

    pub fn mach_port_deallocate(task: mach_port_t, name: mach_port_t) -> kern_return_t;

    pub fn exclaves_sensor_create(
        port: mach_port_t,
        sensor_name: *const c_char,
        out_sensor_port: *mut mach_port_t,
    ) -> kern_return_t;

    pub fn exclaves_sensor_status(
        sensor_port: mach_port_t,
        flags: u64,
        out_status: *mut exclaves_sensor_status_t,
    ) -> kern_return_t;

    pub fn exclaves_sensor_start(
        sensor_port: mach_port_t,
        flags: u64,
        out_status: *mut exclaves_sensor_status_t,
    ) -> kern_return_t;

    pub fn exclaves_sensor_stop(
        sensor_port: mach_port_t,
        flags: u64,
        out_status: *mut exclaves_sensor_status_t,
    ) -> kern_return_t;

    pub fn exclaves_audio_buffer_create(
        port: mach_port_t,
        buffer_name: *const c_char,
        size: mach_vm_size_t,
        out_audio_buffer_port: *mut mach_port_t,
    ) -> kern_return_t;

    pub fn exclaves_audio_buffer_copyout(
        buffer_port: mach_port_t,
        dst_buffer: mach_vm_address_t,
        size1: mach_vm_size_t,
        offset1: mach_vm_size_t,
        size2: mach_vm_size_t,
        offset2: mach_vm_size_t,
    ) -> kern_return_t;
}

/// The task port of the current process.
pub fn mach_task_self() -> mach_port_t {
    // SAFETY: `mach_task_self_` is initialised by libSystem before `main`
    // and never written afterwards.
    unsafe { mach_task_self_ }
}
