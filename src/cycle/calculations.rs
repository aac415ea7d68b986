//! Phase arithmetic over a repeating light/dark cycle.
//!
//! All functions take an hours-since-start offset, which may be negative
//! (before the cycle starts), fractional or very large. The modulo used here
//! is floored, so instants before the start wrap into the previous cycle
//! instead of producing a negative remainder.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{CycleConfig, Phase};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Phase at a point of the cycle, with the position inside the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseSample {
    pub phase: Phase,
    /// Hours since the start of the current cycle, in `[0, cycle_length)`.
    pub offset_in_cycle: f64,
}

impl PhaseSample {
    pub fn is_light(&self) -> bool {
        self.phase.is_light()
    }
}

/// The next phase change, relative to a query offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub target: Phase,
    /// Hours until `target` begins, never negative.
    pub hours_until: f64,
}

/// Signed hours from `start` to `instant`.
pub fn hours_between(start: NaiveDateTime, instant: NaiveDateTime) -> f64 {
    (instant - start).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Floored `hours mod cycle_length`, always in `[0, cycle_length)`.
pub fn phase_offset(config: &CycleConfig, hours_since_start: f64) -> f64 {
    let cycle_length = config.cycle_length();
    let offset = hours_since_start.rem_euclid(cycle_length);
    // rem_euclid rounds tiny negative inputs up to exactly `cycle_length`
    if offset >= cycle_length { 0.0 } else { offset }
}

/// Phase active `hours_since_start` hours after the cycle start.
pub fn phase_at(config: &CycleConfig, hours_since_start: f64) -> PhaseSample {
    let offset_in_cycle = phase_offset(config, hours_since_start);

    let phase = if config.is_always_dark() {
        Phase::Dark
    } else if config.is_always_light() {
        Phase::Light
    } else {
        Phase::from(offset_in_cycle < config.light_hours)
    };

    PhaseSample {
        phase,
        offset_in_cycle,
    }
}

pub fn is_light(config: &CycleConfig, hours_since_start: f64) -> bool {
    phase_at(config, hours_since_start).is_light()
}

/// Number of complete cycles elapsed, floored toward negative infinity.
pub fn cycle_index_at(config: &CycleConfig, hours_since_start: f64) -> i64 {
    (hours_since_start / config.cycle_length()).floor() as i64
}

/// Time until the phase flips, or `None` for a cycle that never changes phase.
pub fn next_transition(config: &CycleConfig, now_hours_since_start: f64) -> Option<Transition> {
    if config.is_always_dark() || config.is_always_light() {
        return None;
    }

    let sample = phase_at(config, now_hours_since_start);
    let hours_until = match sample.phase {
        Phase::Light => config.light_hours - sample.offset_in_cycle,
        Phase::Dark => config.cycle_length() - sample.offset_in_cycle,
    };

    Some(Transition {
        target: sample.phase.opposite(),
        hours_until: hours_until.max(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config(light: f64, dark: f64) -> CycleConfig {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        CycleConfig::new(start, light, dark, 1)
    }

    #[test]
    fn test_light_phase_starts_at_zero() {
        let config = config(12.0, 12.0);
        assert!(is_light(&config, 0.0));
        assert!(is_light(&config, 11.999));
        assert!(!is_light(&config, 12.0));
        assert!(!is_light(&config, 23.999));
        assert!(is_light(&config, 24.0));
    }

    #[test]
    fn test_light_interval_is_half_open() {
        // 27 hour cycle: offset 13 is the first dark instant
        let config = config(13.0, 14.0);
        let sample = phase_at(&config, 13.0);
        assert_eq!(sample.phase, Phase::Dark);
        assert_eq!(sample.offset_in_cycle, 13.0);
    }

    #[test]
    fn test_negative_offsets_wrap_into_previous_cycle() {
        let config = config(10.0, 10.0);
        let sample = phase_at(&config, -5.0);
        assert_eq!(sample.offset_in_cycle, 15.0);
        assert_eq!(sample.phase, Phase::Dark);

        let sample = phase_at(&config, -15.0);
        assert_eq!(sample.offset_in_cycle, 5.0);
        assert_eq!(sample.phase, Phase::Light);
    }

    #[test]
    fn test_tiny_negative_offset_stays_below_cycle_length() {
        let config = config(12.0, 12.0);
        let sample = phase_at(&config, -1e-17);
        assert!(sample.offset_in_cycle < config.cycle_length());
        assert!(sample.offset_in_cycle >= 0.0);
    }

    #[test]
    fn test_fractional_phase_lengths_are_not_rounded() {
        let config = config(12.5, 11.5);
        assert!(is_light(&config, 12.49));
        assert!(!is_light(&config, 12.5));
        assert!(is_light(&config, 24.0));
    }

    #[test]
    fn test_always_dark_and_always_light() {
        let dark = config(0.0, 24.0);
        for x in [-100.0, 0.0, 0.0001, 1e6] {
            assert!(!is_light(&dark, x), "expected dark at {x}");
        }

        let light = config(24.0, 0.0);
        for x in [-100.0, 0.0, 23.9999, 1e6] {
            assert!(is_light(&light, x), "expected light at {x}");
        }
    }

    #[test]
    fn test_cycle_index_floors_toward_negative_infinity() {
        let config = config(10.0, 10.0);
        assert_eq!(cycle_index_at(&config, 0.0), 0);
        assert_eq!(cycle_index_at(&config, 19.99), 0);
        assert_eq!(cycle_index_at(&config, 20.0), 1);
        assert_eq!(cycle_index_at(&config, -0.5), -1);
        assert_eq!(cycle_index_at(&config, -20.0), -1);
        assert_eq!(cycle_index_at(&config, -20.5), -2);
    }

    #[test]
    fn test_next_transition_from_light_and_dark() {
        let config = config(16.0, 8.0);

        let from_light = next_transition(&config, 10.0).unwrap();
        assert_eq!(from_light.target, Phase::Dark);
        assert_eq!(from_light.hours_until, 6.0);

        let from_dark = next_transition(&config, 20.0).unwrap();
        assert_eq!(from_dark.target, Phase::Light);
        assert_eq!(from_dark.hours_until, 4.0);

        let before_start = next_transition(&config, -1.0).unwrap();
        assert_eq!(before_start.target, Phase::Light);
        assert_eq!(before_start.hours_until, 1.0);
    }

    #[test]
    fn test_next_transition_at_boundary_is_full_phase() {
        let config = config(16.0, 8.0);
        let at_dark_start = next_transition(&config, 16.0).unwrap();
        assert_eq!(at_dark_start.target, Phase::Light);
        assert_eq!(at_dark_start.hours_until, 8.0);
    }

    #[test]
    fn test_degenerate_cycles_never_transition() {
        assert_eq!(next_transition(&config(0.0, 24.0), 5.0), None);
        assert_eq!(next_transition(&config(24.0, 0.0), 5.0), None);
        assert_eq!(next_transition(&config(0.0, 0.0), 5.0), None);
    }

    #[test]
    fn test_hours_between_is_signed() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        assert_eq!(hours_between(a, b), 25.5);
        assert_eq!(hours_between(b, a), -25.5);
    }
}
