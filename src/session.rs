use std::sync::Arc;
use std::time::Instant;

use crate::action::Action;
use crate::attempt::{AttemptMachine, AttemptReport};
use crate::estimator::Estimator;
use crate::event_log::EventLog;
use crate::stats::{RunningStatistics, SessionSummary};

/// Everything one tester run shares: the live event log, the attempt state
/// machine and the aggregated results. Owned by the control loop; input
/// producers only ever get a handle to the log.
#[derive(Debug)]
pub struct Session {
    log: Arc<EventLog>,
    machine: AttemptMachine,
    stats: RunningStatistics,
    history: Vec<f64>,
}

impl Session {
    pub fn new(estimator: Estimator) -> Self {
        Self {
            log: Arc::new(EventLog::new()),
            machine: AttemptMachine::new(estimator),
            stats: RunningStatistics::new(),
            history: Vec::new(),
        }
    }

    /// Shared handle for producers on other threads
    pub fn log_handle(&self) -> Arc<EventLog> {
        Arc::clone(&self.log)
    }

    /// Begin a fresh attempt
    pub fn start(&mut self, now: Instant) {
        self.log.reset(now);
    }

    /// Stop accepting input, e.g. while binds are being captured
    pub fn suspend(&mut self) {
        self.log.suspend();
    }

    pub fn is_accepting(&self) -> bool {
        self.log.is_active()
    }

    pub fn record(&self, action: Action, at: Instant) -> bool {
        let accepted = self.log.record(action, at);
        if accepted {
            log::debug!("recorded {action}");
        } else {
            log::debug!("dropped {action}: no attempt running");
        }
        accepted
    }

    pub fn poll(&mut self, now: Instant) -> Option<AttemptReport> {
        let report = self.machine.poll(&self.log, &mut self.stats, now)?;
        self.history.push(report.probability);
        Some(report)
    }

    /// Rebinding is only allowed before the first input of the session.
    pub fn can_rebind(&self) -> bool {
        self.stats.attempt_count() == 0 && self.log.is_empty()
    }

    pub fn stats(&self) -> &RunningStatistics {
        &self.stats
    }

    pub fn pending_inputs(&self) -> usize {
        self.log.len()
    }

    pub fn estimator(&self) -> &Estimator {
        self.machine.estimator()
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        SessionSummary::from_probabilities(&self.history)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Estimator::default())
    }
}
