use std::thread;
use std::time::Duration;

use crate::models::error::PollError;
use crate::models::handles::SensorHandle;
use crate::session::cancellation::CancellationToken;
use crate::traits::capability_broker::CapabilityBroker;

/// Polls sensor status until the broker reports `Allowed`.
pub struct ReadinessPoller<'a, B: CapabilityBroker + ?Sized> {
    broker: &'a B,
    interval: Duration,
    polls: u64,
}

impl<'a, B: CapabilityBroker + ?Sized> ReadinessPoller<'a, B> {
    pub fn new(broker: &'a B, interval: Duration) -> Self {
        Self {
            broker,
            interval,
            polls: 0,
        }
    }

    /// Number of status queries issued so far.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Block until the sensor is allowed, a query fails, or `cancel` is set.
    ///
    /// Any successfully reported status other than `Allowed` means "not yet"
    /// and is retried after the poll interval. `cancel` is checked before
    /// every query, including the first one after each sleep.
    pub fn wait_until_allowed(
        &mut self,
        sensor: SensorHandle,
        cancel: &CancellationToken,
    ) -> Result<(), PollError> {
        loop {
            if cancel.is_cancelled() {
                log::info!("Stopped waiting for authorization after {} polls", self.polls);
                return Err(PollError::Cancelled);
            }

            self.polls += 1;
            let status = self.broker.query_status(sensor).map_err(|e| {
                log::error!("Sensor status query failed: {}", e);
                PollError::QueryFailed(e)
            })?;
            log::info!("Sensor status polled value: {:#x} ({})", status.raw(), status);

            if status.is_allowed() {
                return Ok(());
            }

            thread::sleep(self.interval);
        }
    }
}
