//! Bridge from process signals to lifecycle triggers.
//!
//! | signal           | trigger                 |
//! |------------------|-------------------------|
//! | SIGUSR1          | start                   |
//! | SIGUSR2          | stop                    |
//! | SIGINT / SIGTERM | shutdown                |
//!
//! Signals are received on a dedicated thread, never inside a signal
//! handler, and only ever reach the controller through its `TriggerHandle`.

use std::io;
use std::thread;

use tokio::signal::unix::{signal, Signal, SignalKind};

use sensor_capture_core::TriggerHandle;

struct Signals {
    start: Signal,
    stop: Signal,
    interrupt: Signal,
    terminate: Signal,
}

/// Install the signal handlers and spawn the forwarding thread.
///
/// Handlers are installed before this returns, so a signal sent right
/// afterwards is never lost to its default action. The thread exits after
/// forwarding a shutdown.
pub fn spawn_signal_bridge(handle: TriggerHandle) -> io::Result<thread::JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let signals = {
        let _context = runtime.enter();
        Signals {
            start: signal(SignalKind::user_defined1())?,
            stop: signal(SignalKind::user_defined2())?,
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        }
    };

    thread::Builder::new()
        .name("signal-bridge".into())
        .spawn(move || runtime.block_on(forward_signals(signals, handle)))
}

async fn forward_signals(mut signals: Signals, handle: TriggerHandle) {
    loop {
        tokio::select! {
            _ = signals.start.recv() => {
                log::info!("SIGUSR1 received: starting sensor capture");
                if !handle.start() {
                    log::info!("Start ignored while {}", handle.state());
                }
            }
            _ = signals.stop.recv() => {
                log::info!("SIGUSR2 received: stopping sensor capture");
                if !handle.stop() {
                    log::info!("Stop ignored while {}", handle.state());
                }
            }
            _ = signals.interrupt.recv() => {
                log::info!("SIGINT received: shutting down");
                handle.shutdown();
                break;
            }
            _ = signals.terminate.recv() => {
                log::info!("SIGTERM received: shutting down");
                handle.shutdown();
                break;
            }
        }
    }
}
