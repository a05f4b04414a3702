use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::SessionConfiguration;
use crate::models::error::{CaptureError, PollError, SessionError};
use crate::models::handles::{BufferHandle, SensorHandle};
use crate::models::session_report::{SessionOutcome, SessionReport};
use crate::models::state::LifecycleState;
use crate::session::cancellation::CancellationToken;
use crate::session::capture_loop::CaptureLoop;
use crate::session::readiness::ReadinessPoller;
use crate::session::resource_guard::ResourceGuard;
use crate::storage::report_log;
use crate::traits::capability_broker::CapabilityBroker;
use crate::traits::lifecycle_delegate::LifecycleDelegate;
use crate::traits::output_sink::OutputSink;

/// Event consumed by the controller loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    Shutdown,
}

/// Everything a trigger is checked against, behind one lock so that the
/// check and its effect are atomic with the controller's transitions.
///
/// Only the controller changes `state` and `cancel`. Every session gets a
/// fresh `cancel` token, so a stop can only reach the session it observed.
#[derive(Debug, Default)]
struct LifecycleSlot {
    state: LifecycleState,
    cancel: CancellationToken,
    start_pending: bool,
    shutdown_requested: bool,
}

/// State shared between the controller and its trigger handles.
#[derive(Debug, Default)]
struct SharedLifecycle {
    slot: Mutex<LifecycleSlot>,
}

impl SharedLifecycle {
    fn state(&self) -> LifecycleState {
        self.slot.lock().state
    }
}

/// Cheap, clonable entry point for asynchronous trigger sources.
///
/// Nothing here acquires or releases resources: `start` enqueues a request
/// for the controller, `stop` flips the cancellation flag.
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    shared: Arc<SharedLifecycle>,
    sender: Sender<Trigger>,
}

impl TriggerHandle {
    /// Request a new session. Ignored unless the lifecycle is idle and no
    /// start is already pending. Returns whether the request was queued.
    pub fn start(&self) -> bool {
        let mut slot = self.shared.slot.lock();
        if slot.shutdown_requested {
            return false;
        }
        if !slot.state.is_idle() {
            log::debug!("Ignoring start trigger while {}", slot.state);
            return false;
        }
        if slot.start_pending {
            log::debug!("Ignoring start trigger, a start is already pending");
            return false;
        }
        if self.sender.send(Trigger::Start).is_err() {
            log::warn!("Controller is gone, dropping start trigger");
            return false;
        }
        slot.start_pending = true;
        true
    }

    /// Ask the active session to stop. Ignored unless the lifecycle is
    /// waiting for authorization or capturing. Returns whether it applied.
    pub fn stop(&self) -> bool {
        let slot = self.shared.slot.lock();
        if !slot.state.is_stoppable() {
            log::debug!("Ignoring stop trigger while {}", slot.state);
            return false;
        }
        log::info!("Stop trigger received while {}", slot.state);
        slot.cancel.cancel();
        true
    }

    /// Stop any active session and make the controller loop return.
    ///
    /// Sessions that have not begun yet never start.
    pub fn shutdown(&self) {
        {
            let mut slot = self.shared.slot.lock();
            slot.shutdown_requested = true;
            slot.cancel.cancel();
        }
        // A closed channel means the loop has already returned.
        let _ = self.sender.send(Trigger::Shutdown);
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.state()
    }
}

/// Drives the acquire → wait-for-readiness → capture → release lifecycle.
///
/// Sole owner of the resource guard, the sink and the lifecycle state.
/// Sessions run one at a time on the thread calling [`run`] or
/// [`run_session`]; trigger sources interact only through [`TriggerHandle`].
///
/// [`run`]: LifecycleController::run
/// [`run_session`]: LifecycleController::run_session
pub struct LifecycleController<B: CapabilityBroker, S: OutputSink> {
    broker: Arc<B>,
    sink: S,
    config: SessionConfiguration,
    guard: ResourceGuard<B>,
    shared: Arc<SharedLifecycle>,
    sender: Sender<Trigger>,
    triggers: Receiver<Trigger>,
    delegate: Option<Arc<dyn LifecycleDelegate>>,
    last_report: Option<SessionReport>,
}

impl<B: CapabilityBroker, S: OutputSink> LifecycleController<B, S> {
    pub fn new(broker: Arc<B>, sink: S, config: SessionConfiguration) -> Result<Self, SessionError> {
        config.validate().map_err(SessionError::Configuration)?;
        let (sender, triggers) = mpsc::channel();
        Ok(Self {
            guard: ResourceGuard::new(Arc::clone(&broker)),
            broker,
            sink,
            config,
            shared: Arc::new(SharedLifecycle::default()),
            sender,
            triggers,
            delegate: None,
            last_report: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn LifecycleDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn handle(&self) -> TriggerHandle {
        TriggerHandle {
            shared: Arc::clone(&self.shared),
            sender: self.sender.clone(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.state()
    }

    pub fn last_report(&self) -> Option<&SessionReport> {
        self.last_report.as_ref()
    }

    /// Consume triggers until a shutdown is requested.
    pub fn run(&mut self) {
        log::info!("Lifecycle controller waiting for triggers");
        while let Ok(trigger) = self.triggers.recv() {
            match trigger {
                Trigger::Start => {
                    if self.run_session().is_none() && self.shared.slot.lock().shutdown_requested {
                        break;
                    }
                }
                Trigger::Shutdown => break,
            }
        }
        self.guard.release();
        log::info!("Lifecycle controller shut down");
    }

    /// Run one complete session on the calling thread.
    ///
    /// Returns `None` without touching the broker unless the lifecycle is
    /// idle and no shutdown was requested. Otherwise every acquired resource
    /// has been released and the state is back to `Idle` when this returns.
    pub fn run_session(&mut self) -> Option<SessionReport> {
        let cancel = self.begin_session()?;
        log::info!(
            "Starting sensor '{}' into buffer '{}'",
            self.config.sensor_name,
            self.config.buffer_name
        );

        let mut report = SessionReport::begin(&self.config.sensor_name, &self.config.buffer_name);
        let mut checksum = String::new();
        let outcome = match self.drive(&cancel, &mut report, &mut checksum) {
            Ok(()) => {
                self.set_state(LifecycleState::Stopping);
                SessionOutcome::Stopped
            }
            Err(e) => {
                log::error!("Session failed: {}", e);
                if let Some(ref delegate) = self.delegate {
                    delegate.on_error(&e);
                }
                self.set_state(LifecycleState::Failed);
                SessionOutcome::Failed(e.to_string())
            }
        };

        self.guard.release();
        report.finish(outcome, checksum);
        self.set_state(LifecycleState::Idle);

        if let Some(ref path) = self.config.report_path {
            if let Err(e) = report_log::append_report(&report, path) {
                let e = SessionError::from(e);
                log::warn!("Failed to record session report: {}", e);
                if let Some(ref delegate) = self.delegate {
                    delegate.on_error(&e);
                }
            }
        }
        if let Some(ref delegate) = self.delegate {
            delegate.on_session_finished(&report);
        }

        self.last_report = Some(report.clone());
        Some(report)
    }

    /// Move `Idle` → `Acquiring` and hand out the new session's token.
    ///
    /// The pending start is consumed in the same critical section, so no
    /// second start can slip in while the state is still `Idle`.
    fn begin_session(&self) -> Option<CancellationToken> {
        let cancel = {
            let mut slot = self.shared.slot.lock();
            slot.start_pending = false;
            if slot.shutdown_requested {
                log::info!("Shutdown requested, not starting a session");
                return None;
            }
            if !slot.state.is_idle() {
                return None;
            }
            slot.state = LifecycleState::Acquiring;
            slot.cancel = CancellationToken::new();
            slot.cancel.clone()
        };
        self.notify_state(LifecycleState::Acquiring);
        Some(cancel)
    }

    /// Everything between `Acquiring` and the release. `Ok` means the
    /// session ended because cancellation was observed.
    fn drive(
        &mut self,
        cancel: &CancellationToken,
        report: &mut SessionReport,
        checksum: &mut String,
    ) -> Result<(), SessionError> {
        let (sensor, buffer) = self.guard.acquire(&self.config)?;
        self.set_state(LifecycleState::WaitingForAuthorization);

        if !self.wait_for_authorization(sensor, cancel, report)? {
            return Ok(());
        }

        self.start_sensor(sensor)?;
        self.set_state(LifecycleState::Capturing);

        self.capture(buffer, cancel, report, checksum)
    }

    /// Returns `Ok(false)` when a stop arrived before the sensor was allowed.
    fn wait_for_authorization(
        &self,
        sensor: SensorHandle,
        cancel: &CancellationToken,
        report: &mut SessionReport,
    ) -> Result<bool, SessionError> {
        let mut poller = ReadinessPoller::new(&*self.broker, self.config.poll_interval());
        let result = poller.wait_until_allowed(sensor, cancel);
        report.status_polls = poller.polls();

        match result {
            Ok(()) => Ok(true),
            Err(PollError::Cancelled) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn start_sensor(&mut self, sensor: SensorHandle) -> Result<(), CaptureError> {
        let status = self.broker.start(sensor).map_err(CaptureError::StartFailed)?;
        self.guard.mark_started();
        if !status.is_allowed() {
            return Err(CaptureError::StartRejected(status));
        }
        log::info!("Sensor started successfully");
        Ok(())
    }

    fn capture(
        &mut self,
        buffer: BufferHandle,
        cancel: &CancellationToken,
        report: &mut SessionReport,
        checksum: &mut String,
    ) -> Result<(), SessionError> {
        let destination = self.guard.destination_mut().ok_or_else(|| {
            SessionError::Configuration("destination memory missing after acquisition".into())
        })?;

        let mut capture = CaptureLoop::new(
            &*self.broker,
            buffer,
            destination,
            self.config.poll_interval(),
            self.config.preview_len,
        )
        .with_delegate(self.delegate.as_deref());
        let result = capture.run(cancel, &mut self.sink);

        let (stats, digest) = capture.finish();
        report.stats = stats;
        *checksum = digest;
        result.map_err(SessionError::from)
    }

    fn set_state(&self, new_state: LifecycleState) {
        self.shared.slot.lock().state = new_state;
        self.notify_state(new_state);
    }

    fn notify_state(&self, new_state: LifecycleState) {
        log::debug!("Lifecycle state: {}", new_state);
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(new_state);
        }
    }
}
