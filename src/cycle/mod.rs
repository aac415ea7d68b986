//! The photoperiod engine.
//!
//! A cycle is a light phase of `light_hours` followed by a dark phase of
//! `dark_hours`, repeating forever in both directions from `start`. The light
//! phase is anchored at the start instant: offset `0` of every cycle is the
//! first moment of light, and the light interval is half-open,
//! `[0, light_hours)`.
//!
//! Everything in this module is a pure function of a [`CycleConfig`] and an
//! explicit "now"; nothing here reads the clock or mutates its inputs, so a
//! `CycleConfig` snapshot can be queried from anywhere.
//!
//! - [`calculations`]: phase at an offset, cycle index, next transition
//! - [`grid`]: midnight-aligned day-by-hour grid
//! - [`status`]: live status snapshot for a given "now"

pub mod calculations;
pub mod grid;
pub mod status;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::constants::{CYCLE_LENGTH_EPSILON, MAXIMUM_DURATION_DAYS, MINIMUM_DURATION_DAYS};

pub use calculations::{PhaseSample, Transition};
pub use grid::{CalendarCell, CalendarDay, CalendarGrid};
pub use status::{CycleStatus, TransitionEvent};

/// One of the two states of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Light,
    Dark,
}

impl Phase {
    pub fn is_light(&self) -> bool {
        matches!(self, Self::Light)
    }

    /// The phase that follows this one.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Light => "☀",
            Self::Dark => "☾",
        }
    }
}

impl From<bool> for Phase {
    fn from(is_light: bool) -> Self {
        if is_light { Self::Light } else { Self::Dark }
    }
}

/// Validated input to every engine query.
///
/// Construct through [`CycleConfig::new`] (or `config::validation`, which
/// rejects malformed user input first). The engine assumes finite,
/// non-negative phase lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleConfig {
    /// Wall-clock instant at which the first light phase begins.
    pub start: NaiveDateTime,
    pub light_hours: f64,
    pub dark_hours: f64,
    /// Number of calendar days materialized by the grid, within `[1, 9999]`.
    pub duration_days: u32,
}

impl CycleConfig {
    /// Build a configuration, clamping `duration_days` into `[1, 9999]`.
    pub fn new(start: NaiveDateTime, light_hours: f64, dark_hours: f64, duration_days: u32) -> Self {
        Self {
            start,
            light_hours,
            dark_hours,
            duration_days: duration_days.clamp(MINIMUM_DURATION_DAYS, MAXIMUM_DURATION_DAYS),
        }
    }

    /// Length of one full cycle in hours, never zero.
    pub fn cycle_length(&self) -> f64 {
        let length = self.light_hours + self.dark_hours;
        if length > 0.0 {
            length
        } else {
            CYCLE_LENGTH_EPSILON
        }
    }

    /// Fraction of each cycle spent in the light phase.
    pub fn light_ratio(&self) -> f64 {
        self.light_hours / self.cycle_length()
    }

    /// `light_hours == 0`: the cycle never lights up.
    pub fn is_always_dark(&self) -> bool {
        self.light_hours <= 0.0
    }

    /// `dark_hours == 0` (and some light): the cycle never goes dark.
    pub fn is_always_light(&self) -> bool {
        !self.is_always_dark() && self.dark_hours <= 0.0
    }

    /// Hours between local midnight of the start date and the start instant.
    pub fn fractional_start_offset(&self) -> f64 {
        let time = self.start.time();
        time.hour() as f64
            + time.minute() as f64 / 60.0
            + (time.second() as f64 + time.nanosecond() as f64 / 1e9) / 3600.0
    }

    /// Returns a copy covering a different number of days.
    pub fn with_duration_days(self, duration_days: u32) -> Self {
        Self::new(self.start, self.light_hours, self.dark_hours, duration_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_duration_days_is_clamped() {
        assert_eq!(CycleConfig::new(start(0, 0), 12.0, 12.0, 0).duration_days, 1);
        assert_eq!(
            CycleConfig::new(start(0, 0), 12.0, 12.0, 10_000_000).duration_days,
            9999
        );
        assert_eq!(CycleConfig::new(start(0, 0), 12.0, 12.0, 30).duration_days, 30);
    }

    #[test]
    fn test_zero_length_cycle_uses_epsilon() {
        let config = CycleConfig::new(start(0, 0), 0.0, 0.0, 1);
        assert!(config.cycle_length() > 0.0);
        assert!(config.is_always_dark());
        assert!(!config.is_always_light());
    }

    #[test]
    fn test_fractional_start_offset() {
        assert_eq!(CycleConfig::new(start(0, 0), 1.0, 1.0, 1).fractional_start_offset(), 0.0);
        assert_eq!(CycleConfig::new(start(6, 30), 1.0, 1.0, 1).fractional_start_offset(), 6.5);
        assert_eq!(CycleConfig::new(start(23, 45), 1.0, 1.0, 1).fractional_start_offset(), 23.75);
    }

    #[test]
    fn test_phase_helpers() {
        assert_eq!(Phase::Light.opposite(), Phase::Dark);
        assert_eq!(Phase::Dark.opposite(), Phase::Light);
        assert_eq!(Phase::from(true), Phase::Light);
        assert!(!Phase::Dark.is_light());
    }
}
