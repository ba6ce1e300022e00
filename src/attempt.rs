use std::time::Instant;

use crate::action::InputEvent;
use crate::estimator::{Estimator, MIN_EVENTS};
use crate::event_log::{millis_between, EventLog};
use crate::stats::RunningStatistics;

/// Ticks of silence after the last input before an attempt is abandoned
pub const IDLE_TICKS: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptPhase {
    Active,
    Complete,
    Incomplete,
}

/// Outcome of one finished attempt
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptReport {
    pub ordinal: u32,
    pub phase: AttemptPhase,
    pub probability: f64,
    pub mean: f64,
    pub events: Vec<InputEvent>,
}

impl AttemptReport {
    /// Transcript lines for this attempt
    pub fn lines(&self) -> Vec<String> {
        let chance = match self.phase {
            AttemptPhase::Incomplete => "Incomplete attempt (0.00%)".to_string(),
            _ => format!("Current success chance: {:.2}%", self.probability * 100.0),
        };
        vec![
            format!("Attempt {}", self.ordinal),
            chance,
            format!("Average success chance: {:.2}%", self.mean * 100.0),
        ]
    }
}

/// Classifies the live event log into attempts.
///
/// Polled on a fixed cadence. The attempt is COMPLETE once it holds
/// `MIN_EVENTS` inputs and INCOMPLETE once it has at least one input and
/// `IDLE_TICKS` ticks have passed since the latest one. Either way the
/// result goes into the statistics and the log is reset for the next try.
#[derive(Debug, Clone)]
pub struct AttemptMachine {
    estimator: Estimator,
    phase: AttemptPhase,
}

impl AttemptMachine {
    pub fn new(estimator: Estimator) -> Self {
        Self {
            estimator,
            phase: AttemptPhase::Active,
        }
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    fn idle_limit_ms(&self) -> f64 {
        IDLE_TICKS * self.estimator.tick_ms()
    }

    /// Evaluate the transition rules for the attempt started at `start`.
    fn phase_of(&self, events: &[InputEvent], start: Instant, now: Instant) -> AttemptPhase {
        if events.len() >= MIN_EVENTS {
            return AttemptPhase::Complete;
        }
        match last_event_ms(events) {
            Some(last) if millis_between(start, now) - last >= self.idle_limit_ms() => {
                AttemptPhase::Incomplete
            }
            _ => AttemptPhase::Active,
        }
    }

    /// One polling step. Returns a report when the attempt finished, after
    /// which the log has already been reset.
    pub fn poll(
        &mut self,
        log: &EventLog,
        stats: &mut RunningStatistics,
        now: Instant,
    ) -> Option<AttemptReport> {
        let finished = log.finish_if(now, |events, start| {
            match self.phase_of(events, start, now) {
                AttemptPhase::Active => None,
                phase => Some(phase),
            }
        });
        let Some((phase, events)) = finished else {
            self.phase = AttemptPhase::Active;
            return None;
        };
        self.phase = phase;

        let probability = match phase {
            AttemptPhase::Active => return None,
            AttemptPhase::Complete => self.estimator.estimate(&events),
            AttemptPhase::Incomplete => 0.0,
        };

        stats.record(probability);
        let report = AttemptReport {
            ordinal: stats.attempt_count(),
            phase,
            probability,
            mean: stats.current_mean().unwrap_or(probability),
            events,
        };
        log::info!(
            "attempt {} {:?}: {:.4} (mean {:.4}, {} inputs)",
            report.ordinal,
            report.phase,
            report.probability,
            report.mean,
            report.events.len()
        );

        self.phase = AttemptPhase::Active;
        Some(report)
    }
}

/// Timestamp of the most recent event, relative to the attempt start
fn last_event_ms(events: &[InputEvent]) -> Option<f64> {
    events
        .iter()
        .map(|e| e.timestamp_ms)
        .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))))
}

impl Default for AttemptMachine {
    fn default() -> Self {
        Self::new(Estimator::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn started() -> (EventLog, Instant) {
        let log = EventLog::new();
        let t0 = Instant::now();
        log.reset(t0);
        (log, t0)
    }

    #[test]
    fn empty_attempt_never_times_out() {
        let (log, t0) = started();
        let mut machine = AttemptMachine::default();
        let mut stats = RunningStatistics::new();

        assert_eq!(machine.poll(&log, &mut stats, t0 + ms(10_000)), None);
        assert_eq!(machine.phase(), AttemptPhase::Active);
        assert_eq!(stats.attempt_count(), 0);
    }

    #[test]
    fn three_events_then_idle_is_incomplete() {
        let (log, t0) = started();
        let mut machine = AttemptMachine::default();
        let mut stats = RunningStatistics::new();

        log.record(Action::Attack, t0 + ms(100));
        log.record(Action::Axe, t0 + ms(110));
        log.record(Action::Attack, t0 + ms(160));

        assert_eq!(machine.poll(&log, &mut stats, t0 + ms(300)), None);
        let report = machine.poll(&log, &mut stats, t0 + ms(310)).unwrap();
        assert_matches!(report.phase, AttemptPhase::Incomplete);
        assert_eq!(report.probability, 0.0);
        assert_eq!(report.events.len(), 3);
        assert_eq!(stats.current_mean(), Some(0.0));
    }

    #[test]
    fn idle_is_measured_from_the_last_event() {
        let (log, t0) = started();
        let mut machine = AttemptMachine::default();
        let mut stats = RunningStatistics::new();

        log.record(Action::Attack, t0 + ms(1_000));
        // long after the attempt started but only 100 ms after the input
        assert_eq!(machine.poll(&log, &mut stats, t0 + ms(1_100)), None);
        assert!(machine.poll(&log, &mut stats, t0 + ms(1_150)).is_some());
    }

    #[test]
    fn fourth_event_completes_without_waiting() {
        let (log, t0) = started();
        let mut machine = AttemptMachine::default();
        let mut stats = RunningStatistics::new();

        log.record(Action::Attack, t0 + ms(0));
        log.record(Action::Axe, t0 + ms(0));
        log.record(Action::Attack, t0 + ms(50));
        log.record(Action::Mace, t0 + ms(50));

        let report = machine.poll(&log, &mut stats, t0 + ms(60)).unwrap();
        assert_matches!(report.phase, AttemptPhase::Complete);
        assert_eq!(report.ordinal, 1);
        assert!(report.probability > 0.99);
        assert_eq!(report.mean, report.probability);
    }

    #[test]
    fn terminal_transition_resets_log() {
        let (log, t0) = started();
        let first_start = log.start_time().unwrap();
        let mut machine = AttemptMachine::default();
        let mut stats = RunningStatistics::new();

        log.record(Action::Mace, t0 + ms(5));
        machine.poll(&log, &mut stats, t0 + ms(200)).unwrap();

        assert!(log.is_empty());
        assert!(log.start_time().unwrap() > first_start);
        assert_eq!(machine.phase(), AttemptPhase::Active);
    }

    #[test]
    fn suspended_log_is_never_classified() {
        let log = EventLog::new();
        let mut machine = AttemptMachine::default();
        let mut stats = RunningStatistics::new();
        assert_eq!(machine.poll(&log, &mut stats, Instant::now()), None);
    }

    #[test]
    fn last_event_uses_latest_timestamp() {
        let events = [
            InputEvent::new(30.0, Action::Attack),
            InputEvent::new(10.0, Action::Axe),
        ];
        assert_eq!(last_event_ms(&events), Some(30.0));
        assert_eq!(last_event_ms(&[]), None);
    }

    #[test]
    fn input_racing_with_polls_is_scored_or_pending() {
        let log = Arc::new(EventLog::new());
        log.reset(Instant::now());
        let stop = Arc::new(AtomicBool::new(false));

        let producer = {
            let log = Arc::clone(&log);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut accepted = 0usize;
                while !stop.load(Ordering::Relaxed) {
                    if log.record(Action::Attack, Instant::now()) {
                        accepted += 1;
                    }
                }
                accepted
            })
        };

        let mut machine = AttemptMachine::new(Estimator::new(1.0).unwrap());
        let mut stats = RunningStatistics::new();
        let mut scored = 0usize;
        let deadline = Instant::now() + ms(300);
        while Instant::now() < deadline {
            if let Some(report) = machine.poll(&log, &mut stats, Instant::now()) {
                scored += report.events.len();
            }
        }
        stop.store(true, Ordering::Relaxed);
        let accepted = producer.join().unwrap();

        assert_eq!(accepted, scored + log.len());
        assert!(stats.attempt_count() > 0);
    }

    #[test]
    fn report_lines() {
        let complete = AttemptReport {
            ordinal: 2,
            phase: AttemptPhase::Complete,
            probability: 0.4321,
            mean: 0.2161,
            events: vec![],
        };
        assert_eq!(
            complete.lines(),
            vec![
                "Attempt 2".to_string(),
                "Current success chance: 43.21%".to_string(),
                "Average success chance: 21.61%".to_string(),
            ]
        );

        let incomplete = AttemptReport {
            phase: AttemptPhase::Incomplete,
            probability: 0.0,
            ..complete
        };
        assert_eq!(incomplete.lines()[1], "Incomplete attempt (0.00%)");
    }
}
