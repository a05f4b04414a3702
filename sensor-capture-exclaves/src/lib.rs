//! # sensor-capture-exclaves
//!
//! Exclaves backend for sensor-capture-core.
//!
//! Provides:
//! - `ExclavesBroker`: sensor and audio buffer capabilities via the exclaves calls
//! - `ffi`: raw bindings to the exclaves and Mach port calls
//! - `triggers`: bridge from SIGUSR1 / SIGUSR2 / SIGINT / SIGTERM to lifecycle triggers
//!
//! ## Platform Requirements
//! - An Apple target exposing the exclaves sensor and audio buffer calls
//!   through libSystem
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use sensor_capture_core::{AppendFileSink, LifecycleController, SessionConfiguration};
//! use sensor_capture_exclaves::{triggers, ExclavesBroker};
//!
//! let config = SessionConfiguration::default();
//! let sink = AppendFileSink::new(config.output_path.clone());
//! let mut controller = LifecycleController::new(Arc::new(ExclavesBroker::new()), sink, config)?;
//! let _bridge = triggers::spawn_signal_bridge(controller.handle())?;
//! controller.run();
//! ```

pub mod error;
#[cfg(target_vendor = "apple")]
pub mod exclaves_broker;
#[cfg(target_vendor = "apple")]
pub mod ffi;
#[cfg(unix)]
pub mod triggers;

pub use error::RecorderError;
#[cfg(target_vendor = "apple")]
pub use exclaves_broker::ExclavesBroker;
