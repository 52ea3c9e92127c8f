//! Timer-driven simulation of a phone call.
//!
//! A simulation walks [`CallStatus::SEQUENCE`] for one call id. Each step is
//! appended to the call log and then published on the [`CallEventBus`], so
//! an observer reacting to an event can already read it back from the log.
//! The first status is entered immediately; every non-terminal status is
//! held for the step interval before the next one.

use std::time::Duration;

use dialtone_types::{CallStatus, CallStatusEvent};

use crate::bus::CallEventBus;
use crate::store::CallLogStore;

/// Dwell time of each non-terminal status unless configured otherwise.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_secs(2);

/// What a simulation does when a call log write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFailurePolicy {
    /// Log the failure, still publish the status, and keep going. The call
    /// log ends up with a gap but observers see the full call.
    #[default]
    LogAndContinue,
    /// Log the failure and end the simulation without publishing the
    /// failed status or any later one.
    Abort,
}

/// Outcome of one simulated call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    /// Statuses that were written to the call log.
    pub recorded: Vec<CallStatus>,
    /// Statuses whose call log write failed.
    pub failed: Vec<CallStatus>,
    /// Statuses published on the bus.
    pub published: Vec<CallStatus>,
    /// Whether the run stopped early under [`StoreFailurePolicy::Abort`].
    pub aborted: bool,
}

impl SimulationReport {
    /// True when every status was both recorded and published.
    pub fn is_complete(&self) -> bool {
        !self.aborted
            && self.failed.is_empty()
            && self.recorded == CallStatus::SEQUENCE
            && self.published == CallStatus::SEQUENCE
    }
}

/// Runs call simulations against a shared call log and event bus.
///
/// Cloning is cheap; every clone shares the same pool and channel.
#[derive(Debug, Clone)]
pub struct CallSimulator {
    store: CallLogStore,
    bus: CallEventBus,
    step_interval: Duration,
    failure_policy: StoreFailurePolicy,
}

impl CallSimulator {
    pub fn new(store: CallLogStore, bus: CallEventBus) -> Self {
        Self {
            store,
            bus,
            step_interval: DEFAULT_STEP_INTERVAL,
            failure_policy: StoreFailurePolicy::default(),
        }
    }

    pub fn with_step_interval(mut self, step_interval: Duration) -> Self {
        self.step_interval = step_interval;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: StoreFailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }

    pub fn failure_policy(&self) -> StoreFailurePolicy {
        self.failure_policy
    }

    /// Starts a simulation for `call_id` on a detached task.
    ///
    /// Returns immediately. There is no handle: completion is observable only
    /// through the bus (the `Call ended.` event) or the call log.
    pub fn spawn(&self, call_id: impl Into<String>) {
        let simulator = self.clone();
        let call_id = call_id.into();
        tokio::spawn(async move {
            let report = simulator.run(&call_id).await;
            if report.is_complete() {
                tracing::info!(call_id = %call_id, "call simulation finished");
            } else {
                tracing::warn!(
                    call_id = %call_id,
                    recorded = report.recorded.len(),
                    failed = report.failed.len(),
                    aborted = report.aborted,
                    "call simulation finished with call log failures"
                );
            }
        });
    }

    /// Runs a full simulation for `call_id` and reports what happened.
    pub async fn run(&self, call_id: &str) -> SimulationReport {
        let mut report = SimulationReport::default();
        let mut next = Some(CallStatus::SEQUENCE[0]);

        while let Some(status) = next {
            match self.store.append(call_id, status).await {
                Ok(entry) => {
                    tracing::debug!(call_id, entry_id = entry.id, %status, "call status recorded");
                    report.recorded.push(status);
                }
                Err(e) => {
                    tracing::error!(call_id, %status, "failed to record call status: {}", e);
                    report.failed.push(status);
                    if self.failure_policy == StoreFailurePolicy::Abort {
                        report.aborted = true;
                        return report;
                    }
                }
            }

            let subscribers = self.bus.publish(CallStatusEvent::new(call_id, status));
            report.published.push(status);
            tracing::info!(call_id, %status, subscribers, "call status update");

            next = status.next();
            if next.is_some() {
                tokio::time::sleep(self.step_interval).await;
            }
        }

        report
    }
}
