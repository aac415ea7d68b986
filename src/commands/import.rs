//! Import command - read a JSON cycle record into the settings file.
//!
//! Numeric fields may be numbers or numeric strings. The record is validated
//! as a whole before anything is written; `refreshInterval` and the comments
//! in `photoperiod.toml` are left as they are.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::builder::render_config;
use crate::config::loading::private_path;
use crate::config::validation::validate_record;
use crate::config::{self, Config, CycleRecord};
use crate::cycle::CycleConfig;

/// Handle the import command.
pub fn handle_import_command(path: &str) -> Result<()> {
    log_version!();

    let path = Path::new(path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", private_path(path)))?;
    let cycle = parse_record(&content)
        .with_context(|| format!("Failed to import {}", private_path(path)))?;

    let config_path = Config::get_config_path()?;
    let current = if config_path.exists() {
        match Config::load_from_path(&config_path) {
            Ok(config) => Some(config),
            Err(e) => {
                log_pipe!();
                log_warning!("Existing settings are invalid and will be replaced: {e:#}");
                None
            }
        }
    } else {
        Some(Config::default())
    };

    match current {
        Some(current) => config::write_config(&config_path, &current.with_cycle(&cycle))?,
        None => {
            // A broken file is regenerated rather than edited in place
            fs::write(&config_path, render_config(&Config::default().with_cycle(&cycle)))
                .with_context(|| format!("Failed to write config to {}", private_path(&config_path)))?;
        }
    }
    let updated = Config::load_from_path(&config_path)?;

    log_block_start!("Imported cycle settings from {}", private_path(path));
    updated.log_config();
    log_end!();

    Ok(())
}

/// Parse and validate a JSON cycle record.
pub fn parse_record(content: &str) -> Result<CycleConfig> {
    let record: CycleRecord =
        serde_json::from_str(content).context("Not a valid cycle record")?;
    validate_record(&record)
}

/// Display help for the import command.
pub fn display_help() {
    log_version!();
    log_block_start!("import - Read cycle settings from JSON");
    log_block_start!("Usage: photoperiod import <file>");
    log_block_start!("Description:");
    log_indented!("Reads a record written by 'photoperiod export', validates it and");
    log_indented!("stores it in photoperiod.toml. Invalid records change nothing.");
    log_block_start!("Example:");
    log_indented!("photoperiod import cycle.json");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_accepts_numeric_strings() {
        let cycle = parse_record(
            r#"{"startDate":"2024-01-01T06:00","hoursLight":"16","hoursDark":8,"durationDays":"7"}"#,
        )
        .unwrap();
        assert_eq!(cycle.light_hours, 16.0);
        assert_eq!(cycle.dark_hours, 8.0);
        assert_eq!(cycle.duration_days, 7);
    }

    #[test]
    fn test_parse_record_rejects_bad_input() {
        // missing field
        assert!(parse_record(r#"{"startDate":"2024-01-01","hoursLight":1,"hoursDark":1}"#).is_err());
        // non-numeric string
        assert!(
            parse_record(
                r#"{"startDate":"2024-01-01","hoursLight":"many","hoursDark":1,"durationDays":1}"#
            )
            .is_err()
        );
        // negative hours
        assert!(
            parse_record(r#"{"startDate":"2024-01-01","hoursLight":-2,"hoursDark":1,"durationDays":1}"#)
                .is_err()
        );
        // zero days
        assert!(
            parse_record(r#"{"startDate":"2024-01-01","hoursLight":2,"hoursDark":1,"durationDays":0}"#)
                .is_err()
        );
        assert!(parse_record("not json").is_err());
    }
}
