//! Simulate command - run the live view on an accelerated clock.
//!
//! A [`SimulatedTimeSource`] replaces the real clock before anything is logged,
//! so every status line carries the simulated timestamp and the live view walks
//! through phase changes and day boundaries without waiting for them.

use anyhow::{Context, Result};
use chrono::Local;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::DISPLAY_DATE_FORMAT;
use crate::logger::Log;
use crate::time_source::{self, SimulatedTimeSource};

/// Acceleration used when no multiplier is given.
pub const DEFAULT_MULTIPLIER: f64 = 3600.0;

/// Multiplier value the argument parser uses for `--fast-forward`.
pub const FAST_FORWARD: f64 = -1.0;

/// Handle the simulate command.
///
/// # Arguments
/// * `start_time` - Simulated start, any accepted date-time format
/// * `end_time` - Simulated end, must be after the start
/// * `multiplier` - Time acceleration (`<= 0` = default, [`FAST_FORWARD`] = instant)
/// * `log_file` - Write all output to this file instead of stdout
/// * `debug_enabled` - Report every tick
pub fn handle_simulate_command(
    start_time: &str,
    end_time: &str,
    multiplier: f64,
    log_file: Option<String>,
    debug_enabled: bool,
) -> Result<()> {
    let start = time_source::parse_datetime(start_time).context("Invalid start time")?;
    let end = time_source::parse_datetime(end_time).context("Invalid end time")?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    let fast_forward = multiplier == FAST_FORWARD;
    let acceleration = effective_multiplier(multiplier);

    // Must happen before any logging so timestamps are simulated from the start
    time_source::init_time_source(Arc::new(SimulatedTimeSource::new(start, end, acceleration)));

    let _log_guard = match log_file {
        Some(path) => Some(Log::start_file_logging(path)?),
        None => None,
    };

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.format(DISPLAY_DATE_FORMAT),
        end.format(DISPLAY_DATE_FORMAT)
    );

    let duration = end.signed_duration_since(start);
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );

    if fast_forward {
        log_indented!("Time acceleration: fast-forward (instant execution)");
    } else {
        log_indented!(
            "Time acceleration: {}x (will complete in ~{:.1} seconds)",
            acceleration as u64,
            duration.num_seconds() as f64 / acceleration
        );
    }

    if debug_enabled {
        log_pipe!();
        log_debug!("Simulated time source initialized");
    } else {
        log_pipe!();
        log_decorated!("To save output to a file, run:");
        log_indented!(
            "photoperiod simulate \"{}\" \"{}\" --log photoperiod-simulation-{}.log",
            start_time,
            end_time,
            Local::now().format("%Y%m%d-%H%M%S")
        );
    }

    super::status::run_follow_mode(Config::load()?, false, debug_enabled)
}

/// Multiplier handed to the time source: `0.0` for fast-forward, the default
/// for non-positive values.
pub fn effective_multiplier(multiplier: f64) -> f64 {
    if multiplier == FAST_FORWARD {
        0.0
    } else if multiplier <= 0.0 || !multiplier.is_finite() {
        DEFAULT_MULTIPLIER
    } else {
        multiplier
    }
}

/// Display help for the simulate command.
pub fn display_help() {
    log_version!();
    log_block_start!("simulate - Run the live view on a simulated clock");
    log_block_start!("Usage: photoperiod simulate <start> <end> [<multiplier> | --fast-forward]");
    log_block_start!("Arguments:");
    log_indented!("<start>, <end>       YYYY-MM-DDTHH:MM[:SS], YYYY-MM-DD HH:MM or YYYY-MM-DD");
    log_indented!("<multiplier>         Time acceleration (default {}x)", DEFAULT_MULTIPLIER as u64);
    log_block_start!("Options:");
    log_indented!("-f, --fast-forward   Run as fast as possible");
    log_indented!("-l, --log <file>     Write output to <file>");
    log_block_start!("Examples:");
    log_indented!("photoperiod simulate 2024-01-01 2024-01-03");
    log_indented!("photoperiod simulate \"2024-01-01 06:00\" 2024-02-01 --fast-forward");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_multiplier() {
        assert_eq!(effective_multiplier(FAST_FORWARD), 0.0);
        assert_eq!(effective_multiplier(0.0), DEFAULT_MULTIPLIER);
        assert_eq!(effective_multiplier(-5.0), DEFAULT_MULTIPLIER);
        assert_eq!(effective_multiplier(f64::NAN), DEFAULT_MULTIPLIER);
        assert_eq!(effective_multiplier(60.0), 60.0);
    }
}
