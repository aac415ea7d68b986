//! Get command implementation for reading configuration fields
//!
//! Values are reported with defaults applied, so `get` always answers even
//! for fields missing from the settings file.

use anyhow::Result;
use serde_json::{Value, json};

use crate::config::{Config, FIELD_NAMES, canonical_field};

/// Handle the get command - read configuration fields
///
/// # Arguments
/// * `fields` - Field names to retrieve, or `all`
/// * `json` - Whether to output in JSON format
pub fn handle_get_command(fields: &[String], json: bool) -> Result<()> {
    let config = Config::load()?;
    let values = collect_values(&config, fields)?;

    if json {
        let mut object = serde_json::Map::new();
        for (field, value) in values {
            object.insert(field.to_string(), value);
        }
        println!("{}", serde_json::to_string(&object)?);
    } else if values.len() == 1 && !is_all(fields) {
        println!("{}", display_value(&values[0].1));
    } else {
        for (field, value) in &values {
            println!("{}={}", field, display_value(value));
        }
    }

    Ok(())
}

fn is_all(fields: &[String]) -> bool {
    fields.len() == 1 && fields[0] == "all"
}

/// Resolve the requested fields and read their values, in request order.
pub(crate) fn collect_values(config: &Config, fields: &[String]) -> Result<Vec<(&'static str, Value)>> {
    let requested: Vec<&'static str> = if is_all(fields) {
        FIELD_NAMES.to_vec()
    } else {
        let mut resolved = Vec::with_capacity(fields.len());
        for field in fields {
            match canonical_field(field) {
                Some(name) => resolved.push(name),
                None => {
                    super::report_unknown_field(field);
                    anyhow::bail!("Unknown configuration field: '{}'", field);
                }
            }
        }
        resolved
    };

    Ok(requested
        .into_iter()
        .map(|field| (field, field_value(config, field)))
        .collect())
}

/// Effective value of `field`, with defaults applied.
pub(crate) fn field_value(config: &Config, field: &str) -> Value {
    let record = config.record();
    match field {
        "startDate" => json!(record.start_date),
        "hoursLight" => json!(record.hours_light),
        "hoursDark" => json!(record.hours_dark),
        "durationDays" => json!(record.duration_days as u32),
        "refreshInterval" => json!(config.refresh_interval()),
        _ => Value::Null,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Display detailed help for the get command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("get - Read configuration fields");
    log_block_start!("Usage: photoperiod get [--json] <field> [<field>...]");
    log_block_start!("Options:");
    log_indented!("-j, --json           Output in JSON format");
    log_block_start!("Special Fields:");
    log_indented!("all                  Get all configuration fields");
    log_block_start!("Available Fields:");
    log_indented!("startDate            When the first light phase begins");
    log_indented!("hoursLight           Hours of light per cycle");
    log_indented!("hoursDark            Hours of dark per cycle");
    log_indented!("durationDays         Days shown in the grid");
    log_indented!("refreshInterval      Seconds between live status refreshes");
    log_block_start!("Examples:");
    log_indented!("# Get single field value");
    log_indented!("photoperiod get hoursLight");
    log_indented!("12");
    log_pipe!();
    log_indented!("# Get multiple field values");
    log_indented!("photoperiod get hoursLight hoursDark");
    log_indented!("hoursLight=12");
    log_indented!("hoursDark=12");
    log_pipe!();
    log_indented!("# Get values in JSON format");
    log_indented!("photoperiod get --json hoursLight hoursDark");
    log_indented!("{{\"hoursLight\":12.0,\"hoursDark\":12.0}}");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            start_date: Some("2024-01-01T06:30:00".to_string()),
            hours_light: Some(12.5),
            hours_dark: None,
            duration_days: Some(10),
            refresh_interval: None,
        }
    }

    #[test]
    fn test_collect_values_applies_defaults() {
        let fields = vec!["hours_dark".to_string(), "refreshInterval".to_string()];
        let values = collect_values(&config(), &fields).unwrap();
        assert_eq!(values[0], ("hoursDark", json!(12.0)));
        assert_eq!(values[1], ("refreshInterval", json!(30)));
    }

    #[test]
    fn test_collect_all_fields_in_file_order() {
        let values = collect_values(&config(), &["all".to_string()]).unwrap();
        let names: Vec<&str> = values.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, FIELD_NAMES);
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        crate::logger::Log::set_enabled(false);
        assert!(collect_values(&config(), &["latitude".to_string()]).is_err());
        crate::logger::Log::set_enabled(true);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!(12.0)), "12");
        assert_eq!(display_value(&json!(12.5)), "12.5");
        assert_eq!(display_value(&json!(10)), "10");
        assert_eq!(display_value(&json!("2024-01-01T06:30:00")), "2024-01-01T06:30:00");
    }
}
