//! Scripted test doubles for the broker, the sink and the delegate.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::chunk::CaptureChunk;
use crate::models::error::{BrokerError, SessionError, SinkError};
use crate::models::handles::{BufferHandle, CopyRegion, SensorHandle, SensorStatus};
use crate::models::session_report::SessionReport;
use crate::models::state::LifecycleState;
use crate::traits::capability_broker::CapabilityBroker;
use crate::traits::lifecycle_delegate::LifecycleDelegate;
use crate::traits::output_sink::OutputSink;

/// Broker calls per operation. Creates count successes only; every other
/// call counts attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallCounts {
    pub sensor_creates: u64,
    pub sensor_destroys: u64,
    pub buffer_creates: u64,
    pub buffer_destroys: u64,
    pub status_queries: u64,
    pub starts: u64,
    pub stops: u64,
    pub copy_outs: u64,
}

type Hook = Box<dyn FnMut(u64) + Send>;

struct Inner {
    counts: CallCounts,
    events: Vec<&'static str>,
    statuses: VecDeque<Result<SensorStatus, BrokerError>>,
    copy_results: VecDeque<Result<(), BrokerError>>,
    start_result: Result<SensorStatus, BrokerError>,
    fail_sensor_create: Option<i32>,
    fail_buffer_create: Option<i32>,
    fail_stop: Option<i32>,
    live_sensors: HashSet<u32>,
    live_buffers: HashSet<u32>,
    next_port: u32,
}

/// Call-counting broker.
///
/// Status queries and copy-outs follow their scripts and fall back to
/// `Allowed` and success once a script runs out. Every copy-out fills the
/// destination with its 1-based call number. Hooks run after the call is
/// counted, without holding the broker lock.
pub struct MockBroker {
    inner: Mutex<Inner>,
    status_hook: Mutex<Option<Hook>>,
    copy_hook: Mutex<Option<Hook>>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                counts: CallCounts::default(),
                events: Vec::new(),
                statuses: VecDeque::new(),
                copy_results: VecDeque::new(),
                start_result: Ok(SensorStatus::Allowed),
                fail_sensor_create: None,
                fail_buffer_create: None,
                fail_stop: None,
                live_sensors: HashSet::new(),
                live_buffers: HashSet::new(),
                next_port: 0x100,
            }),
            status_hook: Mutex::new(None),
            copy_hook: Mutex::new(None),
        }
    }

    pub fn counts(&self) -> CallCounts {
        self.inner.lock().counts
    }

    /// Attempted calls in order, failed ones included.
    pub fn events(&self) -> Vec<&'static str> {
        self.inner.lock().events.clone()
    }

    pub fn live_handles(&self) -> usize {
        let inner = self.inner.lock();
        inner.live_sensors.len() + inner.live_buffers.len()
    }

    pub fn script_statuses(&self, statuses: Vec<Result<SensorStatus, BrokerError>>) {
        self.inner.lock().statuses = statuses.into();
    }

    pub fn script_copy_results(&self, results: Vec<Result<(), BrokerError>>) {
        self.inner.lock().copy_results = results.into();
    }

    pub fn set_start_result(&self, result: Result<SensorStatus, BrokerError>) {
        self.inner.lock().start_result = result;
    }

    pub fn fail_sensor_create(&self, code: i32) {
        self.inner.lock().fail_sensor_create = Some(code);
    }

    pub fn fail_buffer_create(&self, code: i32) {
        self.inner.lock().fail_buffer_create = Some(code);
    }

    pub fn fail_stop(&self, code: i32) {
        self.inner.lock().fail_stop = Some(code);
    }

    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock();
        inner.fail_sensor_create = None;
        inner.fail_buffer_create = None;
        inner.fail_stop = None;
    }

    pub fn on_status_query(&self, hook: impl FnMut(u64) + Send + 'static) {
        *self.status_hook.lock() = Some(Box::new(hook));
    }

    pub fn on_copy_out(&self, hook: impl FnMut(u64) + Send + 'static) {
        *self.copy_hook.lock() = Some(Box::new(hook));
    }

    fn run_hook(hook: &Mutex<Option<Hook>>, call: u64) {
        if let Some(hook) = hook.lock().as_mut() {
            hook(call);
        }
    }
}

impl CapabilityBroker for MockBroker {
    fn create_sensor(&self, _name: &str) -> Result<SensorHandle, BrokerError> {
        let mut inner = self.inner.lock();
        inner.events.push("create_sensor");
        if let Some(code) = inner.fail_sensor_create {
            return Err(BrokerError::new("create_sensor", code));
        }
        inner.counts.sensor_creates += 1;
        inner.next_port += 1;
        let port = inner.next_port;
        inner.live_sensors.insert(port);
        Ok(SensorHandle::from_raw(port))
    }

    fn create_buffer(&self, _name: &str, _size: usize) -> Result<BufferHandle, BrokerError> {
        let mut inner = self.inner.lock();
        inner.events.push("create_buffer");
        if let Some(code) = inner.fail_buffer_create {
            return Err(BrokerError::new("create_buffer", code));
        }
        inner.counts.buffer_creates += 1;
        inner.next_port += 1;
        let port = inner.next_port;
        inner.live_buffers.insert(port);
        Ok(BufferHandle::from_raw(port))
    }

    fn query_status(&self, _sensor: SensorHandle) -> Result<SensorStatus, BrokerError> {
        let (result, call) = {
            let mut inner = self.inner.lock();
            inner.events.push("query_status");
            inner.counts.status_queries += 1;
            let result = inner
                .statuses
                .pop_front()
                .unwrap_or(Ok(SensorStatus::Allowed));
            (result, inner.counts.status_queries)
        };
        Self::run_hook(&self.status_hook, call);
        result
    }

    fn start(&self, _sensor: SensorHandle) -> Result<SensorStatus, BrokerError> {
        let mut inner = self.inner.lock();
        inner.events.push("start");
        inner.counts.starts += 1;
        inner.start_result.clone()
    }

    fn stop(&self, _sensor: SensorHandle) -> Result<SensorStatus, BrokerError> {
        let mut inner = self.inner.lock();
        inner.events.push("stop");
        inner.counts.stops += 1;
        match inner.fail_stop {
            Some(code) => Err(BrokerError::new("stop", code)),
            None => Ok(SensorStatus::Allowed),
        }
    }

    fn copy_out(
        &self,
        _buffer: BufferHandle,
        destination: &mut [u8],
        _primary: CopyRegion,
        _wrap: CopyRegion,
    ) -> Result<(), BrokerError> {
        let (result, call) = {
            let mut inner = self.inner.lock();
            inner.events.push("copy_out");
            inner.counts.copy_outs += 1;
            let result = inner.copy_results.pop_front().unwrap_or(Ok(()));
            (result, inner.counts.copy_outs)
        };
        if result.is_ok() {
            destination.fill(call as u8);
        }
        Self::run_hook(&self.copy_hook, call);
        result
    }

    fn destroy_sensor(&self, sensor: SensorHandle) {
        let mut inner = self.inner.lock();
        inner.events.push("destroy_sensor");
        inner.counts.sensor_destroys += 1;
        inner.live_sensors.remove(&sensor.raw());
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        let mut inner = self.inner.lock();
        inner.events.push("destroy_buffer");
        inner.counts.buffer_destroys += 1;
        inner.live_buffers.remove(&buffer.raw());
    }
}

/// In-memory sink whose clones share the same chunk list.
#[derive(Clone, Default)]
pub struct MemorySink {
    chunks: Arc<Mutex<Vec<CaptureChunk>>>,
    failures_left: Arc<Mutex<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` appends with an open error.
    pub fn fail_next(&mut self, count: usize) {
        *self.failures_left.lock() = count;
    }

    pub fn chunks(&self) -> Vec<CaptureChunk> {
        self.chunks.lock().clone()
    }
}

impl OutputSink for MemorySink {
    fn append(&mut self, chunk: CaptureChunk) -> Result<usize, SinkError> {
        {
            let mut failures_left = self.failures_left.lock();
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(SinkError::Open("scripted failure".into()));
            }
        }
        let len = chunk.len();
        self.chunks.lock().push(chunk);
        Ok(len)
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

/// Delegate that records every notification.
#[derive(Default)]
pub struct RecordingDelegate {
    states: Mutex<Vec<LifecycleState>>,
    previews: Mutex<Vec<(u64, String)>>,
    errors: Mutex<Vec<SessionError>>,
    reports: Mutex<Vec<SessionReport>>,
}

impl RecordingDelegate {
    pub fn states(&self) -> Vec<LifecycleState> {
        self.states.lock().clone()
    }

    pub fn previews(&self) -> Vec<(u64, String)> {
        self.previews.lock().clone()
    }

    pub fn errors(&self) -> Vec<SessionError> {
        self.errors.lock().clone()
    }

    pub fn reports(&self) -> Vec<SessionReport> {
        self.reports.lock().clone()
    }
}

impl LifecycleDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: LifecycleState) {
        self.states.lock().push(state);
    }

    fn on_chunk_captured(&self, sequence: u64, preview: &str) {
        self.previews.lock().push((sequence, preview.to_string()));
    }

    fn on_error(&self, error: &SessionError) {
        self.errors.lock().push(error.clone());
    }

    fn on_session_finished(&self, report: &SessionReport) {
        self.reports.lock().push(report.clone());
    }
}
