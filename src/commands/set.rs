//! Set command implementation for modifying configuration fields
//!
//! This command updates individual settings in `photoperiod.toml` without
//! manually editing the file, preserving comments. A running live view picks
//! the change up through its file watcher.

use anyhow::{Context, Result};
use std::fs;

use crate::config::builder::update_field_in_content;
use crate::config::loading::private_path;
use crate::config::validation::{validate_config, validate_phase_hours};
use crate::config::{Config, canonical_field};
use crate::constants::*;
use crate::time_source::parse_datetime;

/// Handle the set command - update configuration fields
pub fn handle_set_command(fields: &[(String, String)]) -> Result<()> {
    log_version!();

    // Loading first creates the file on first use and refuses a broken one
    let current = Config::load()?;
    let config_path = Config::get_config_path()?;

    // Validate every field before touching the file
    let mut validated_fields = Vec::new();
    for (field, value) in fields {
        let Some(name) = canonical_field(field) else {
            super::report_unknown_field(field);
            anyhow::bail!("Configuration validation failed");
        };
        match validate_field_value(name, value) {
            Ok(formatted_value) => validated_fields.push((name, formatted_value)),
            Err(e) => {
                log_pipe!();
                log_error!("Invalid value for field '{}': {}", field, e);
                anyhow::bail!("Configuration validation failed");
            }
        }
    }

    let mut content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config from {}", private_path(&config_path)))?;

    let mut updated_fields = Vec::new();
    for (field, formatted_value) in &validated_fields {
        let updated_content = update_field_in_content(&content, field, formatted_value);
        if updated_content != content {
            content = updated_content;
            updated_fields.push((*field, formatted_value.as_str()));
        }
    }

    if updated_fields.is_empty() {
        log_block_start!("Configuration unchanged");
        if let [(field, value)] = validated_fields.as_slice() {
            log_indented!("{} is already set to {}", field, value);
        } else {
            log_indented!("All fields already have the specified values");
        }
        log_end!();
        return Ok(());
    }

    // The combined result must still describe a valid cycle
    let updated: Config = toml::from_str(&content).context("Updated configuration is not valid TOML")?;
    validate_config(&updated)?;
    updated.cycle()?;

    fs::write(&config_path, &content)
        .with_context(|| format!("Failed to write config to {}", private_path(&config_path)))?;

    log_block_start!("Updated configuration");
    for (field, value) in &updated_fields {
        log_indented!("{} = {}", field, value);
    }
    log_indented!("in {}", private_path(&config_path));

    if current.cycle()? != updated.cycle()? {
        log_block_start!("A running live view reloads automatically");
    }

    log_end!();
    Ok(())
}

/// Validate a field value and return it as a TOML literal.
pub(crate) fn validate_field_value(field: &str, value: &str) -> Result<String> {
    let toml_value = match field {
        "startDate" => {
            let unquoted = value.trim().trim_matches(|c| c == '"' || c == '\'');
            let start = parse_datetime(unquoted)?;
            return Ok(format!("\"{}\"", start.format(EXPORT_DATE_FORMAT)));
        }
        _ => value.trim().to_string(),
    };

    // Parse a one-line document so TOML decides what a number is
    let document: toml::Table = format!("{field} = {toml_value}")
        .parse()
        .with_context(|| format!("Invalid TOML syntax for field '{}'", field))?;
    let field_value = document
        .get(field)
        .context("Failed to extract field value")?;

    match field {
        "hoursLight" | "hoursDark" => {
            let hours = field_value
                .as_float()
                .or_else(|| field_value.as_integer().map(|i| i as f64))
                .context("Hours must be a number")?;
            validate_phase_hours(hours, field)?;
            Ok(hours.to_string())
        }

        "durationDays" => {
            let days = field_value
                .as_integer()
                .context("Duration must be a whole number of days")?;
            if days < MINIMUM_DURATION_DAYS as i64 {
                anyhow::bail!("Duration must be at least {} day", MINIMUM_DURATION_DAYS);
            }
            if days > MAXIMUM_DURATION_DAYS as i64 {
                log_warning!("durationDays capped at {} days", MAXIMUM_DURATION_DAYS);
                return Ok(MAXIMUM_DURATION_DAYS.to_string());
            }
            Ok(days.to_string())
        }

        "refreshInterval" => {
            let interval = field_value
                .as_integer()
                .context("Refresh interval must be an integer (seconds)")?;
            if interval < MINIMUM_REFRESH_INTERVAL as i64
                || interval > MAXIMUM_REFRESH_INTERVAL as i64
            {
                anyhow::bail!(
                    "Refresh interval must be between {} and {} seconds",
                    MINIMUM_REFRESH_INTERVAL,
                    MAXIMUM_REFRESH_INTERVAL
                );
            }
            Ok(interval.to_string())
        }

        _ => anyhow::bail!("Unknown configuration field: '{}'", field),
    }
}

/// Display detailed help for the set command.
pub fn display_help() {
    log_version!();
    log_block_start!("set - Update configuration fields");
    log_block_start!("Usage: photoperiod set <field>=<value> [<field>=<value>...]");
    log_block_start!("Description:");
    log_indented!("Updates photoperiod.toml in place, keeping comments and layout.");
    log_indented!("All values are validated before anything is written.");
    log_block_start!("Fields:");
    log_indented!("startDate        YYYY-MM-DDTHH:MM[:SS], YYYY-MM-DD HH:MM or YYYY-MM-DD");
    log_indented!("hoursLight       0 or more hours");
    log_indented!("hoursDark        0 or more hours");
    log_indented!("durationDays     {}-{}", MINIMUM_DURATION_DAYS, MAXIMUM_DURATION_DAYS);
    log_indented!(
        "refreshInterval  {}-{} seconds",
        MINIMUM_REFRESH_INTERVAL,
        MAXIMUM_REFRESH_INTERVAL
    );
    log_block_start!("Examples:");
    log_indented!("photoperiod set hoursLight=16 hoursDark=8");
    log_indented!("photoperiod set startDate=2024-03-01T06:00");
    log_end!();
}
