//! `exclave-recorderd`: captures the exclaves microphone buffer into an
//! append-only file, driven by process signals.
//!
//! ```text
//! exclave-recorderd [config.json]
//!
//! kill -USR1 <pid>   start a session
//! kill -USR2 <pid>   stop the session
//! kill -TERM <pid>   stop, release and exit
//! ```

use std::process::ExitCode;

use sensor_capture_exclaves::RecorderError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_vendor = "apple")]
fn run() -> Result<(), RecorderError> {
    use std::path::Path;
    use std::sync::Arc;

    use sensor_capture_core::{AppendFileSink, LifecycleController, SessionConfiguration};
    use sensor_capture_exclaves::{triggers, ExclavesBroker};

    let config = match std::env::args_os().nth(1) {
        Some(path) => SessionConfiguration::from_json_file(Path::new(&path))?,
        None => SessionConfiguration::default(),
    };
    log::info!(
        "Recording sensor '{}' into {}",
        config.sensor_name,
        config.output_path.display()
    );

    let start_on_launch = config.start_on_launch;
    let sink = AppendFileSink::new(config.output_path.clone());
    let mut controller = LifecycleController::new(Arc::new(ExclavesBroker::new()), sink, config)?;
    let handle = controller.handle();
    let bridge = triggers::spawn_signal_bridge(handle.clone())?;

    if start_on_launch {
        handle.start();
    }
    controller.run();

    if bridge.join().is_err() {
        log::warn!("Signal bridge thread panicked");
    }
    Ok(())
}

#[cfg(not(target_vendor = "apple"))]
fn run() -> Result<(), RecorderError> {
    Err(RecorderError::UnsupportedPlatform)
}
