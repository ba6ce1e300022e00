use itertools::{Itertools, MinMaxResult};

use crate::action::{Action, InputEvent};

/// Ticks of context shown on either side of the recorded inputs
pub const CONTEXT_TICKS: f64 = 2.0;

/// Plot-ready view of one finished attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineView {
    pub x_bounds: [f64; 2],
    /// tick boundaries inside `x_bounds`, counted from 0
    pub gridlines: Vec<f64>,
    /// (action, [(t, lane)]) in `Action::ALL` order
    pub series: Vec<(Action, Vec<(f64, f64)>)>,
}

impl TimelineView {
    pub fn from_events(events: &[InputEvent], tick_ms: f64) -> Option<Self> {
        let (first, last) = match events.iter().map(|e| e.timestamp_ms).minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(t) => (t, t),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };

        let start = (first - CONTEXT_TICKS * tick_ms).max(0.0);
        let end = last + CONTEXT_TICKS * tick_ms;

        let gridlines = (0..)
            .map(|k| k as f64 * tick_ms)
            .take_while(|x| *x <= end)
            .filter(|x| *x >= start)
            .collect();

        let series = Action::ALL
            .into_iter()
            .map(|action| {
                let points = events
                    .iter()
                    .filter(|e| e.action == action)
                    .map(|e| (e.timestamp_ms, action.lane()))
                    .collect();
                (action, points)
            })
            .collect();

        Some(Self {
            x_bounds: [start, end],
            gridlines,
            series,
        })
    }
}
