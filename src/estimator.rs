//! Tick-phase success estimation.
//!
//! The game advances in 50 ms ticks whose alignment with the wall clock is
//! unknown. A stun slam lands when attack and axe share tick `n` and attack
//! and mace share tick `n + 1`. Since the phase offset is uniform over one
//! tick, the success chance of a recorded attempt is the fraction of phase
//! offsets for which that holds. We measure it by testing every phase on an
//! evenly spaced grid over `[0, tick)`.

use std::collections::BTreeMap;

use crate::action::{Action, ActionSet, InputEvent};

pub const TICKS_PER_SECOND: u32 = 20;
pub const TICK_MS: f64 = 1000.0 / TICKS_PER_SECOND as f64;
pub const DEFAULT_RESOLUTION_MS: f64 = 0.05;
/// Finest sampling step, 50k samples per tick
pub const MIN_RESOLUTION_MS: f64 = 0.001;

/// Fewest events that can contain both halves of the maneuver
pub const MIN_EVENTS: usize = 4;

/// Index of the tick containing `t` when tick boundaries sit at `phase + k * tick_ms`.
/// An event exactly on a boundary belongs to the tick that starts there.
pub fn tick_index(t: f64, phase: f64, tick_ms: f64) -> i64 {
    ((t - phase) / tick_ms).floor() as i64
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimator {
    tick_ms: f64,
    resolution_ms: f64,
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            resolution_ms: DEFAULT_RESOLUTION_MS,
        }
    }
}

impl Estimator {
    /// Returns `None` unless `MIN_RESOLUTION_MS <= resolution_ms <= TICK_MS`.
    pub fn new(resolution_ms: f64) -> Option<Self> {
        Self::with_tick(TICK_MS, resolution_ms)
    }

    pub fn with_tick(tick_ms: f64, resolution_ms: f64) -> Option<Self> {
        let valid = tick_ms.is_finite()
            && tick_ms > 0.0
            && resolution_ms.is_finite()
            && resolution_ms >= MIN_RESOLUTION_MS
            && resolution_ms <= tick_ms;
        valid.then_some(Self {
            tick_ms,
            resolution_ms,
        })
    }

    pub fn tick_ms(&self) -> f64 {
        self.tick_ms
    }

    pub fn resolution_ms(&self) -> f64 {
        self.resolution_ms
    }

    /// Candidate phase offsets: `i * resolution` for every `i` that stays below one tick.
    pub fn phases(&self) -> impl Iterator<Item = f64> + '_ {
        let samples = (self.tick_ms / self.resolution_ms).ceil() as usize;
        (0..samples)
            .map(move |i| i as f64 * self.resolution_ms)
            .take_while(move |p| *p < self.tick_ms)
    }

    /// Whether the stun slam lands if tick boundaries sit at `phase + k * tick`.
    pub fn succeeds_at_phase(&self, phase: f64, events: &[InputEvent]) -> bool {
        let mut by_tick: BTreeMap<i64, ActionSet> = BTreeMap::new();
        for event in events {
            by_tick
                .entry(tick_index(event.timestamp_ms, phase, self.tick_ms))
                .or_default()
                .insert(event.action);
        }

        by_tick.iter().any(|(tick, first)| {
            first.contains(Action::Attack)
                && first.contains(Action::Axe)
                && by_tick.get(&(tick + 1)).is_some_and(|second| {
                    second.contains(Action::Attack) && second.contains(Action::Mace)
                })
        })
    }

    /// Fraction of sampled phase offsets for which the attempt succeeds, in `[0, 1]`.
    pub fn estimate(&self, events: &[InputEvent]) -> f64 {
        debug_assert!(
            events.len() >= MIN_EVENTS,
            "estimate needs at least {MIN_EVENTS} events, got {}",
            events.len()
        );

        let (hits, total) = self.phases().fold((0usize, 0usize), |(hits, total), phase| {
            let hit = self.succeeds_at_phase(phase, events) as usize;
            (hits + hit, total + 1)
        });

        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64
    }
}

/// Estimate with the default tick length and resolution
pub fn estimate(events: &[InputEvent]) -> f64 {
    Estimator::default().estimate(events)
}
