//! Host clock abstraction for real and simulated time.
//!
//! The cycle engine never reads the clock itself: every query takes "now" as an
//! argument. This module is the one place where "now" is sampled, so the live
//! view can run against the real wall clock or against an accelerated
//! simulation without any change to the engine.
//!
//! Instants are wall-clock `NaiveDateTime`s. Photoperiod deliberately has no
//! notion of timezones beyond the host's local clock.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Local, NaiveDate, NaiveDateTime};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use crate::constants::{SIGNAL_POLL_INTERVAL_MS, START_DATE_FORMATS};

static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Source of "now" and of the sleeps between live-view ticks.
pub trait TimeSource: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Sleep for the specified duration (or simulate it).
    fn sleep(&self, duration: StdDuration);

    fn is_simulated(&self) -> bool;

    /// Longest single sleep the live view makes between two signal checks.
    fn poll_step(&self) -> StdDuration {
        StdDuration::from_millis(SIGNAL_POLL_INTERVAL_MS)
    }

    /// Whether a simulation has reached its end time (always false for real time).
    fn is_ended(&self) -> bool {
        false
    }
}

/// The host's local clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Accelerated clock running from `start` to `end`.
///
/// With a positive multiplier, sleeping `d` takes `d / multiplier` of real time.
/// A multiplier of `0.0` selects fast-forward: sleeps return almost immediately
/// and simply advance the simulated clock.
pub struct SimulatedTimeSource {
    start: NaiveDateTime,
    end: NaiveDateTime,
    multiplier: f64,
    elapsed: Mutex<ChronoDuration>,
}

impl SimulatedTimeSource {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, multiplier: f64) -> Self {
        Self {
            start,
            end,
            multiplier: multiplier.max(0.0),
            elapsed: Mutex::new(ChronoDuration::zero()),
        }
    }

    fn is_fast_forward(&self) -> bool {
        self.multiplier == 0.0
    }

    fn current(&self) -> NaiveDateTime {
        let elapsed = *self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        (self.start + elapsed).min(self.end)
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> NaiveDateTime {
        self.current()
    }

    fn sleep(&self, duration: StdDuration) {
        let remaining = self.end - self.current();
        let requested = ChronoDuration::from_std(duration).unwrap_or(remaining);
        let step = requested.min(remaining).max(ChronoDuration::zero());

        if self.is_fast_forward() {
            // Yield so log output keeps up with the simulation
            std::thread::sleep(StdDuration::from_millis(1));
        } else if let Ok(real) = step.to_std() {
            std::thread::sleep(real.div_f64(self.multiplier));
        }

        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += step;
    }

    fn is_simulated(&self) -> bool {
        true
    }

    /// The simulated time that passes during one real signal poll interval.
    /// Fast-forward sleeps take no real time, so a whole interval is one step.
    fn poll_step(&self) -> StdDuration {
        if self.is_fast_forward() {
            return StdDuration::MAX;
        }
        let real = StdDuration::from_millis(SIGNAL_POLL_INTERVAL_MS);
        StdDuration::try_from_secs_f64(real.as_secs_f64() * self.multiplier)
            .unwrap_or(StdDuration::MAX)
    }

    fn is_ended(&self) -> bool {
        self.current() >= self.end
    }
}

/// A clock frozen at one instant; sleeping advances it by the slept duration.
#[cfg(any(test, feature = "testing-support"))]
pub struct FixedTimeSource {
    now: Mutex<NaiveDateTime>,
}

#[cfg(any(test, feature = "testing-support"))]
impl FixedTimeSource {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap() = now;
    }
}

#[cfg(any(test, feature = "testing-support"))]
impl TimeSource for FixedTimeSource {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: StdDuration) {
        let mut now = self.now.lock().unwrap();
        *now += ChronoDuration::from_std(duration).unwrap();
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Install the global time source (first call wins).
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

fn global() -> &'static Arc<dyn TimeSource> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource))
}

/// The installed time source, or the real clock when none was installed.
pub fn source() -> &'static dyn TimeSource {
    global().as_ref()
}

/// Current time from the global time source.
pub fn now() -> NaiveDateTime {
    global().now()
}

pub fn sleep(duration: StdDuration) {
    global().sleep(duration)
}

pub fn is_simulated() -> bool {
    global().is_simulated()
}

pub fn simulation_ended() -> bool {
    global().is_ended()
}

/// Parse an ISO-like local date-time as used by the `startDate` field.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS[.fff]]`, the same with a space instead of
/// `T`, and a bare `YYYY-MM-DD` meaning local midnight.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim();

    for format in START_DATE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .with_context(|| {
            format!("Invalid date-time '{trimmed}'. Use YYYY-MM-DDTHH:MM or YYYY-MM-DD HH:MM:SS")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    #[test]
    fn test_parse_datetime_accepts_all_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        assert_eq!(at("2024-03-05T07:30"), expected);
        assert_eq!(at("2024-03-05T07:30:00"), expected);
        assert_eq!(at("2024-03-05 07:30"), expected);
        assert_eq!(at("2024-03-05 07:30:00"), expected);
        assert_eq!(at("  2024-03-05T07:30  "), expected);
    }

    #[test]
    fn test_parse_datetime_date_only_is_midnight() {
        let parsed = at("2024-03-05");
        assert_eq!(parsed.hour(), 0);
        assert_eq!(parsed.minute(), 0);
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("yesterday").is_err());
        assert!(parse_datetime("2024-13-01T00:00").is_err());
        assert!(parse_datetime("").is_err());
    }

    #[test]
    fn test_simulated_fast_forward_advances_without_waiting() {
        let source = SimulatedTimeSource::new(at("2024-01-01T00:00"), at("2024-01-02T00:00"), 0.0);
        source.sleep(StdDuration::from_secs(3600));
        assert_eq!(source.now(), at("2024-01-01T01:00"));
        assert!(!source.is_ended());
    }

    #[test]
    fn test_simulated_time_is_capped_at_end() {
        let source = SimulatedTimeSource::new(at("2024-01-01T00:00"), at("2024-01-01T02:00"), 0.0);
        source.sleep(StdDuration::from_secs(5 * 3600));
        assert_eq!(source.now(), at("2024-01-01T02:00"));
        assert!(source.is_ended());
    }

    #[test]
    fn test_simulated_poll_step_scales_with_multiplier() {
        let start = at("2024-01-01T00:00");
        let end = at("2024-02-01T00:00");
        assert_eq!(
            SimulatedTimeSource::new(start, end, 3600.0).poll_step(),
            StdDuration::from_secs(360)
        );
        assert_eq!(
            SimulatedTimeSource::new(start, end, 0.0).poll_step(),
            StdDuration::MAX
        );
        assert_eq!(
            FixedTimeSource::new(start).poll_step(),
            StdDuration::from_millis(SIGNAL_POLL_INTERVAL_MS)
        );
    }

    #[test]
    fn test_fixed_time_source_moves_only_when_told() {
        let source = FixedTimeSource::new(at("2024-01-01T00:00"));
        assert_eq!(source.now(), at("2024-01-01T00:00"));
        source.sleep(StdDuration::from_secs(90));
        assert_eq!(source.now(), at("2024-01-01T00:01:30"));
        source.set(at("2024-06-01T12:00"));
        assert_eq!(source.now(), at("2024-06-01T12:00"));
    }
}
