//! Application-wide defaults, limits and exit codes.
//!
//! Settings that are absent from the configuration file fall back to the
//! `DEFAULT_*` values here; the `MINIMUM_*`/`MAXIMUM_*` pairs are the hard
//! limits enforced by `config::validation`.

// # Cycle defaults
pub const DEFAULT_HOURS_LIGHT: f64 = 12.0;
pub const DEFAULT_HOURS_DARK: f64 = 12.0;
pub const DEFAULT_DURATION_DAYS: u32 = 7;

// # Cycle limits
pub const MINIMUM_DURATION_DAYS: u32 = 1;
pub const MAXIMUM_DURATION_DAYS: u32 = 9999;
/// Phases longer than a year are accepted with a warning.
pub const UNUSUAL_PHASE_HOURS: f64 = 8760.0;
/// Cycle length used when both phases are zero, keeping the modulo total.
pub const CYCLE_LENGTH_EPSILON: f64 = 1e-9;

// # Live view
pub const DEFAULT_REFRESH_INTERVAL: u64 = 30; // seconds
pub const MINIMUM_REFRESH_INTERVAL: u64 = 5;
pub const MAXIMUM_REFRESH_INTERVAL: u64 = 3600;
/// How often the live loop wakes to check for signals between ticks.
pub const SIGNAL_POLL_INTERVAL_MS: u64 = 100;

// # Formats
/// Seconds are always written; fractional seconds only when present.
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
pub const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Accepted `startDate` layouts, tried in order.
pub const START_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// # Settings file
pub const CONFIG_DIR_NAME: &str = "photoperiod";
pub const CONFIG_FILE_NAME: &str = "photoperiod.toml";

// # Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

#[cfg(any(test, feature = "testing-support"))]
pub mod test_constants {
    pub const TEST_STANDARD_START: &str = "2024-01-01T00:00";
    pub const TEST_STANDARD_HOURS_LIGHT: f64 = 12.0;
    pub const TEST_STANDARD_HOURS_DARK: f64 = 12.0;
    pub const TEST_STANDARD_DURATION_DAYS: u32 = 2;
    pub const TEST_STANDARD_REFRESH_INTERVAL: u64 = 30;
}
