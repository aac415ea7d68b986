//! Live status snapshot for a given "now".
//!
//! [`CycleStatus`] bundles everything the status panel shows: the active
//! phase, elapsed time, how many full cycles have passed, the next transition
//! and the energy balance. It is recomputed from scratch on every clock tick
//! and is serializable for `status --json`.

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use serde::Serialize;

use super::calculations::{self, PhaseSample, hours_between};
use super::{CycleConfig, Phase};

/// Hours in a light phase under an even 12/12 split, per hour elapsed.
const REFERENCE_LIGHT_RATIO: f64 = 0.5;

/// The next phase change as an absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    pub next_phase: Phase,
    pub instant: NaiveDateTime,
    pub hours_remaining: f64,
}

/// Signed hours from the cycle start to `now`; negative before the start.
pub fn elapsed_since(config: &CycleConfig, now: NaiveDateTime) -> f64 {
    hours_between(config.start, now)
}

pub fn current_phase(config: &CycleConfig, now: NaiveDateTime) -> PhaseSample {
    calculations::phase_at(config, elapsed_since(config, now))
}

/// Full cycles elapsed at `now`, clamped to zero before the start.
pub fn super_cycle_count(config: &CycleConfig, now: NaiveDateTime) -> u64 {
    calculations::cycle_index_at(config, elapsed_since(config, now)).max(0) as u64
}

/// Next transition converted to an absolute instant.
pub fn next_transition_event(config: &CycleConfig, now: NaiveDateTime) -> Option<TransitionEvent> {
    calculations::next_transition(config, elapsed_since(config, now)).map(|transition| {
        let millis = (transition.hours_until * 3_600_000.0).round() as i64;
        TransitionEvent {
            next_phase: transition.target,
            instant: now + ChronoDuration::milliseconds(millis),
            hours_remaining: transition.hours_until,
        }
    })
}

/// Light-hour deficit against an even 12/12 split after `elapsed_hours`.
///
/// Positive when the cycle has given less light than 12/12 would have.
pub fn energy_balance(config: &CycleConfig, elapsed_hours: f64) -> f64 {
    if elapsed_hours < 0.0 {
        return 0.0;
    }
    REFERENCE_LIGHT_RATIO * elapsed_hours - config.light_ratio() * elapsed_hours
}

/// Everything the status display needs, computed for one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStatus {
    pub now: NaiveDateTime,
    pub phase: Phase,
    pub offset_in_cycle: f64,
    /// Signed; negative while the cycle has not started yet.
    pub elapsed_hours: f64,
    pub started: bool,
    /// Whole days since the start, clamped to zero.
    pub days_elapsed: u64,
    pub super_cycle_count: u64,
    pub next_transition: Option<TransitionEvent>,
    pub energy_balance: f64,
}

impl CycleStatus {
    pub fn at(config: &CycleConfig, now: NaiveDateTime) -> Self {
        let elapsed_hours = elapsed_since(config, now);
        let sample = calculations::phase_at(config, elapsed_hours);

        Self {
            now,
            phase: sample.phase,
            offset_in_cycle: sample.offset_in_cycle,
            elapsed_hours,
            started: elapsed_hours >= 0.0,
            days_elapsed: (elapsed_hours / 24.0).floor().max(0.0) as u64,
            super_cycle_count: super_cycle_count(config, now),
            next_transition: next_transition_event(config, now),
            energy_balance: energy_balance(config, elapsed_hours),
        }
    }
}
