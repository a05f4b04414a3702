//! # sensor-capture-core
//!
//! Platform-agnostic sensor capture core library.
//!
//! Acquires a sensor handle and a shared buffer handle from a platform
//! broker, waits for the sensor to be allowed, copies buffer contents into an
//! append-only sink until stopped, and releases every resource exactly once
//! on every exit path. Platform backends implement the `CapabilityBroker`
//! trait and plug into the generic `LifecycleController`.
//!
//! ## Architecture
//!
//! ```text
//! sensor-capture-core (this crate)
//! ├── traits/       ← CapabilityBroker, OutputSink, LifecycleDelegate
//! ├── models/       ← handles, errors, LifecycleState, SessionConfiguration, CaptureChunk, SessionReport
//! ├── session/      ← ResourceGuard, ReadinessPoller, CaptureLoop, LifecycleController
//! └── storage/      ← AppendFileSink, session report log
//! ```

pub mod models;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod mock;

// Re-export key types at crate root for convenience.
pub use models::chunk::CaptureChunk;
pub use models::config::SessionConfiguration;
pub use models::error::{
    AcquisitionError, BrokerError, CaptureError, PollError, SessionError, SinkError,
};
pub use models::handles::{BufferHandle, CopyRegion, SensorHandle, SensorStatus};
pub use models::session_report::{CaptureStats, SessionOutcome, SessionReport};
pub use models::state::LifecycleState;
pub use session::cancellation::CancellationToken;
pub use session::capture_loop::CaptureLoop;
pub use session::controller::{LifecycleController, Trigger, TriggerHandle};
pub use session::readiness::ReadinessPoller;
pub use session::resource_guard::ResourceGuard;
pub use storage::append_sink::AppendFileSink;
pub use traits::capability_broker::CapabilityBroker;
pub use traits::lifecycle_delegate::LifecycleDelegate;
pub use traits::output_sink::OutputSink;
