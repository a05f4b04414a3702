pub mod cancellation;
pub mod capture_loop;
pub mod controller;
pub mod readiness;
pub mod resource_guard;
