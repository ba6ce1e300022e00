use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::action::{Action, InputEvent};

#[derive(Debug, Default)]
struct LogState {
    events: Vec<InputEvent>,
    start_time: Option<Instant>,
}

impl LogState {
    /// Clear the events and stamp a new start, strictly after the previous one.
    fn restart(&mut self, now: Instant) -> Instant {
        let start = match self.start_time {
            Some(prev) if now <= prev => prev + Duration::from_nanos(1),
            _ => now,
        };
        self.events.clear();
        self.start_time = Some(start);
        start
    }
}

/// Append-only event storage for the attempt in progress.
///
/// A single mutex guards both the events and the attempt's `start_time`, so
/// producers on other threads can never observe a cleared log that has not
/// been re-stamped yet.
#[derive(Debug, Default)]
pub struct EventLog {
    inner: Mutex<LogState>,
}

pub(crate) fn millis_between(start: Instant, at: Instant) -> f64 {
    at.saturating_duration_since(start).as_nanos() as f64 / 1_000_000.0
}

impl EventLog {
    /// A log with no attempt running; every `record` is rejected until `reset`
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `action` observed at `at`. Returns false when no attempt is active.
    pub fn record(&self, action: Action, at: Instant) -> bool {
        let mut state = self.lock();
        let Some(start) = state.start_time else {
            return false;
        };
        // input captured just before a reset belongs to the new attempt at 0 ms
        let timestamp_ms = millis_between(start, at);
        state.events.push(InputEvent::new(timestamp_ms, action));
        true
    }

    /// Let `decide` inspect the running attempt. When it returns a verdict the
    /// events are drained and a new start is stamped before the lock is
    /// released, so no concurrent `record` can fall between the two.
    pub fn finish_if<T>(
        &self,
        now: Instant,
        decide: impl FnOnce(&[InputEvent], Instant) -> Option<T>,
    ) -> Option<(T, Vec<InputEvent>)> {
        let mut state = self.lock();
        let start = state.start_time?;
        let verdict = decide(&state.events, start)?;
        let events = std::mem::take(&mut state.events);
        state.restart(now);
        Some((verdict, events))
    }

    /// Clear the log and stamp a new attempt start, strictly after the previous one.
    pub fn reset(&self, now: Instant) -> Instant {
        self.lock().restart(now)
    }

    /// Clear the log and stop accepting input until the next `reset`.
    pub fn suspend(&self) {
        let mut state = self.lock();
        state.events.clear();
        state.start_time = None;
    }

    pub fn is_active(&self) -> bool {
        self.lock().start_time.is_some()
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.lock().start_time
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn events(&self) -> Vec<InputEvent> {
        self.lock().events.clone()
    }
}
