//! Configuration validation functionality.
//!
//! Everything that turns raw user input (settings file, `set` arguments,
//! imported JSON) into a [`CycleConfig`] passes through here. Unparsable
//! dates, non-finite or negative hours and non-positive durations are
//! rejected; the engine never sees them.

use anyhow::{Context, Result};

use super::{Config, CycleRecord};
use crate::constants::*;
use crate::cycle::CycleConfig;
use crate::time_source::parse_datetime;

/// Validate every field present in the settings file.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(ref start_date) = config.start_date {
        parse_datetime(start_date).context("Invalid startDate")?;
    }

    if let Some(hours) = config.hours_light {
        validate_phase_hours(hours, "hoursLight")?;
    }

    if let Some(hours) = config.hours_dark {
        validate_phase_hours(hours, "hoursDark")?;
    }

    if let Some(days) = config.duration_days
        && days < MINIMUM_DURATION_DAYS
    {
        anyhow::bail!(
            "durationDays ({}) must be at least {}",
            days,
            MINIMUM_DURATION_DAYS
        );
    }

    if let Some(interval) = config.refresh_interval
        && !(MINIMUM_REFRESH_INTERVAL..=MAXIMUM_REFRESH_INTERVAL).contains(&interval)
    {
        anyhow::bail!(
            "refreshInterval ({} seconds) must be between {} and {} seconds",
            interval,
            MINIMUM_REFRESH_INTERVAL,
            MAXIMUM_REFRESH_INTERVAL
        );
    }

    let light = config.hours_light.unwrap_or(DEFAULT_HOURS_LIGHT);
    let dark = config.hours_dark.unwrap_or(DEFAULT_HOURS_DARK);
    warn_on_unusual_cycle(light, dark);

    Ok(())
}

/// Parse and check a cycle record, producing the engine configuration.
///
/// `durationDays` is truncated to a whole number of days and clamped to
/// [`MAXIMUM_DURATION_DAYS`] with a warning; anything below one day is an
/// error.
pub fn validate_record(record: &CycleRecord) -> Result<CycleConfig> {
    let start = parse_datetime(&record.start_date).context("Invalid startDate")?;

    validate_phase_hours(record.hours_light, "hoursLight")?;
    validate_phase_hours(record.hours_dark, "hoursDark")?;

    let days = record.duration_days;
    if !days.is_finite() {
        anyhow::bail!("durationDays must be a finite number (got {})", days);
    }
    if days < MINIMUM_DURATION_DAYS as f64 {
        anyhow::bail!(
            "durationDays ({}) must be at least {}",
            days,
            MINIMUM_DURATION_DAYS
        );
    }

    let duration_days = if days > MAXIMUM_DURATION_DAYS as f64 {
        log_warning!(
            "durationDays ({}) capped at {} days",
            days,
            MAXIMUM_DURATION_DAYS
        );
        MAXIMUM_DURATION_DAYS
    } else {
        days.trunc() as u32
    };

    Ok(CycleConfig::new(
        start,
        record.hours_light,
        record.hours_dark,
        duration_days,
    ))
}

/// A phase length must be a finite, non-negative number of hours.
pub(crate) fn validate_phase_hours(hours: f64, field_name: &str) -> Result<()> {
    if !hours.is_finite() {
        anyhow::bail!("{} must be a finite number (got {})", field_name, hours);
    }
    if hours < 0.0 {
        anyhow::bail!("{} ({} hours) must not be negative", field_name, hours);
    }
    Ok(())
}

fn warn_on_unusual_cycle(light: f64, dark: f64) {
    if let Some(warning) = unusual_cycle_warning(light, dark) {
        log_warning!("{}", warning);
    }
}

/// Legal but probably unintended cycles.
fn unusual_cycle_warning(light: f64, dark: f64) -> Option<String> {
    if light == 0.0 && dark == 0.0 {
        Some("hoursLight and hoursDark are both 0; the cycle stays dark.".to_string())
    } else if light + dark < 1.0 {
        Some(format!(
            "Very short cycle ({}h) changes phase more than once per grid cell.",
            light + dark
        ))
    } else if light.max(dark) > UNUSUAL_PHASE_HOURS {
        Some(format!(
            "A phase of {}h lasts longer than a year; the grid may never change phase.",
            light.max(dark)
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: &str, light: f64, dark: f64, days: f64) -> CycleRecord {
        CycleRecord {
            start_date: start.to_string(),
            hours_light: light,
            hours_dark: dark,
            duration_days: days,
        }
    }

    #[test]
    fn test_valid_record() {
        let cycle = validate_record(&record("2024-01-01T06:30", 12.5, 11.5, 14.0)).unwrap();
        assert_eq!(cycle.light_hours, 12.5);
        assert_eq!(cycle.dark_hours, 11.5);
        assert_eq!(cycle.duration_days, 14);
        assert_eq!(cycle.fractional_start_offset(), 6.5);
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(validate_record(&record("yesterday", 12.0, 12.0, 7.0)).is_err());
        assert!(validate_record(&record("2024-13-01T00:00", 12.0, 12.0, 7.0)).is_err());
    }

    #[test]
    fn test_rejects_negative_and_non_finite_hours() {
        assert!(validate_record(&record("2024-01-01", -1.0, 12.0, 7.0)).is_err());
        assert!(validate_record(&record("2024-01-01", 12.0, f64::NAN, 7.0)).is_err());
        assert!(validate_record(&record("2024-01-01", f64::INFINITY, 12.0, 7.0)).is_err());
    }

    #[test]
    fn test_phases_longer_than_a_year_are_allowed() {
        let cycle = validate_record(&record("2024-01-01T00:00", 9000.0, 12.0, 7.0)).unwrap();
        assert_eq!(cycle.light_hours, 9000.0);
        assert!(validate_record(&record("2024-01-01", 12.0, 1.0e6, 7.0)).is_ok());

        let config = Config {
            hours_light: Some(9000.0),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_unusual_cycle_warnings() {
        assert!(unusual_cycle_warning(12.0, 12.0).is_none());
        assert!(unusual_cycle_warning(UNUSUAL_PHASE_HOURS, 12.0).is_none());
        assert!(unusual_cycle_warning(0.0, 0.0).unwrap().contains("both 0"));
        assert!(unusual_cycle_warning(0.25, 0.25).unwrap().contains("Very short"));
        assert!(unusual_cycle_warning(9000.0, 12.0).unwrap().contains("longer than a year"));
    }

    #[test]
    fn test_zero_hours_are_allowed() {
        assert!(validate_record(&record("2024-01-01", 0.0, 24.0, 1.0)).is_ok());
        assert!(validate_record(&record("2024-01-01", 24.0, 0.0, 1.0)).is_ok());
        assert!(validate_record(&record("2024-01-01", 0.0, 0.0, 1.0)).is_ok());
    }

    #[test]
    fn test_duration_days_boundaries() {
        assert!(validate_record(&record("2024-01-01", 12.0, 12.0, 0.0)).is_err());
        assert!(validate_record(&record("2024-01-01", 12.0, 12.0, -3.0)).is_err());
        assert!(validate_record(&record("2024-01-01", 12.0, 12.0, 0.5)).is_err());
        assert!(validate_record(&record("2024-01-01", 12.0, 12.0, f64::NAN)).is_err());

        let truncated = validate_record(&record("2024-01-01", 12.0, 12.0, 3.9)).unwrap();
        assert_eq!(truncated.duration_days, 3);

        let capped = validate_record(&record("2024-01-01", 12.0, 12.0, 10_000_000.0)).unwrap();
        assert_eq!(capped.duration_days, MAXIMUM_DURATION_DAYS);
    }

    #[test]
    fn test_validate_config_refresh_interval() {
        let mut config = Config {
            refresh_interval: Some(4),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());

        config.refresh_interval = Some(3601);
        assert!(validate_config(&config).is_err());

        config.refresh_interval = Some(60);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_fields() {
        let bad_date = Config {
            start_date: Some("not a date".to_string()),
            ..Default::default()
        };
        assert!(validate_config(&bad_date).is_err());

        let zero_days = Config {
            duration_days: Some(0),
            ..Default::default()
        };
        assert!(validate_config(&zero_days).is_err());

        let negative_dark = Config {
            hours_dark: Some(-0.5),
            ..Default::default()
        };
        assert!(validate_config(&negative_dark).is_err());

        assert!(validate_config(&Config::default()).is_ok());
    }
}
