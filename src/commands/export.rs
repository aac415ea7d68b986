//! Export command - write the cycle record as JSON.
//!
//! The record has the same four keys as the settings file:
//!
//! ```json
//! {
//!   "startDate": "2024-01-01T06:00:00",
//!   "hoursLight": 16.0,
//!   "hoursDark": 8.0,
//!   "durationDays": 7
//! }
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::loading::private_path;
use crate::config::{Config, CycleRecord};

/// Handle the export command.
///
/// # Arguments
/// * `path` - Destination file; `None` writes to stdout
pub fn handle_export_command(path: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let json = export_record(&config)?;

    match path {
        None => println!("{json}"),
        Some(path) => {
            let path = Path::new(path);
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write export to {}", private_path(path)))?;

            log_version!();
            log_block_start!("Exported cycle settings");
            log_indented!("to {}", private_path(path));
            log_end!();
        }
    }

    Ok(())
}

/// The validated settings as a pretty-printed JSON cycle record.
pub fn export_record(config: &Config) -> Result<String> {
    let cycle = config.cycle()?;
    serde_json::to_string_pretty(&CycleRecord::from_cycle(&cycle))
        .context("Failed to serialize cycle record")
}

/// Display help for the export command.
pub fn display_help() {
    log_version!();
    log_block_start!("export - Write the cycle settings as JSON");
    log_block_start!("Usage: photoperiod export [<file>]");
    log_block_start!("Description:");
    log_indented!("Writes startDate, hoursLight, hoursDark and durationDays as a JSON");
    log_indented!("record, to <file> or to stdout. The record can be read back with");
    log_indented!("'photoperiod import'.");
    log_block_start!("Examples:");
    log_indented!("photoperiod export cycle.json");
    log_indented!("photoperiod export > cycle.json");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_record_shape() {
        let config = Config {
            start_date: Some("2024-01-01 06:00".to_string()),
            hours_light: Some(16.0),
            hours_dark: Some(8.5),
            duration_days: Some(7),
            refresh_interval: Some(60),
        };
        let value: serde_json::Value = serde_json::from_str(&export_record(&config).unwrap()).unwrap();

        assert_eq!(value["startDate"], "2024-01-01T06:00:00");
        assert_eq!(value["hoursLight"], 16.0);
        assert_eq!(value["hoursDark"], 8.5);
        assert_eq!(value["durationDays"], 7);
        assert!(value.get("refreshInterval").is_none());
    }

    #[test]
    fn test_export_rejects_invalid_settings() {
        let config = Config {
            start_date: Some("someday".to_string()),
            ..Default::default()
        };
        assert!(export_record(&config).is_err());
    }
}
