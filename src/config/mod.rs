//! Settings persistence, validation and the exported cycle record.
//!
//! Photoperiod keeps its settings in `photoperiod.toml`:
//!
//! ```toml
//! #[Cycle]
//! startDate = "2024-01-01T00:00:00" # When the first light phase begins (YYYY-MM-DDTHH:MM[:SS])
//! hoursLight = 12                   # Hours of light per cycle (0 or more)
//! hoursDark = 12                    # Hours of dark per cycle (0 or more)
//! durationDays = 7                  # Days shown in the grid (1-9999)
//!
//! #[Live view]
//! refreshInterval = 30              # Seconds between status refreshes (5-3600)
//! ```
//!
//! ## Configuration Sources
//!
//! 1. `--config <dir>`: `<dir>/photoperiod.toml`
//! 2. `$XDG_CONFIG_HOME/photoperiod/photoperiod.toml`
//!
//! A commented default file is created on first load.
//!
//! ## Record
//!
//! The four cycle keys double as the JSON export/import schema
//! ([`CycleRecord`]). Raw input only becomes an engine [`CycleConfig`] after
//! passing [`validation::validate_record`]; the engine itself never sees
//! malformed values.

pub mod builder;
pub mod loading;
pub mod validation;
pub mod watcher;

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;

use crate::constants::*;
use crate::cycle::CycleConfig;

pub use builder::{create_default_config, write_config};
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};
pub use watcher::start_config_watcher;

/// Settings keys in file order, as written to `photoperiod.toml`.
pub const FIELD_NAMES: &[&str] = &[
    "startDate",
    "hoursLight",
    "hoursDark",
    "durationDays",
    "refreshInterval",
];

/// Resolve a field name given in camelCase or snake_case to its canonical key.
pub fn canonical_field(name: &str) -> Option<&'static str> {
    let folded: String = name
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect::<String>()
        .to_lowercase();
    FIELD_NAMES
        .iter()
        .copied()
        .find(|field| field.to_lowercase() == folded)
}

/// snake_case spelling of a canonical key, accepted in the settings file.
pub fn snake_case_field(field: &str) -> String {
    let mut snake = String::with_capacity(field.len() + 4);
    for c in field.chars() {
        if c.is_ascii_uppercase() {
            snake.push('_');
            snake.push(c.to_ascii_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Contents of `photoperiod.toml`. Missing fields fall back to defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(alias = "hours_light")]
    pub hours_light: Option<f64>,
    #[serde(alias = "hours_dark")]
    pub hours_dark: Option<f64>,
    #[serde(alias = "duration_days")]
    pub duration_days: Option<u32>,
    #[serde(alias = "refresh_interval")]
    pub refresh_interval: Option<u64>, // seconds between live view ticks
}

/// The flat cycle record shared by the settings file and JSON export/import.
///
/// Deserialization coerces numeric strings (`"12.5"`) into numbers; anything
/// else that is not a number is a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    pub start_date: String,
    #[serde(deserialize_with = "coerce_number")]
    pub hours_light: f64,
    #[serde(deserialize_with = "coerce_number")]
    pub hours_dark: f64,
    #[serde(deserialize_with = "coerce_number", serialize_with = "whole_days")]
    pub duration_days: f64,
}

fn whole_days<S>(days: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if days.fract() == 0.0 && *days >= 0.0 && *days <= u32::MAX as f64 {
        serializer.serialize_u32(*days as u32)
    } else {
        serializer.serialize_f64(*days)
    }
}

fn coerce_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("'{text}' is not a number"))),
    }
}

impl CycleRecord {
    pub fn from_cycle(cycle: &CycleConfig) -> Self {
        Self {
            start_date: cycle.start.format(EXPORT_DATE_FORMAT).to_string(),
            hours_light: cycle.light_hours,
            hours_dark: cycle.dark_hours,
            duration_days: cycle.duration_days as f64,
        }
    }
}

impl Config {
    /// Load configuration using the module's load function
    pub fn load() -> Result<Self> {
        load()
    }

    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        load_from_path(path)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        get_config_path()
    }

    /// The settings as a cycle record, with defaults filled in.
    pub fn record(&self) -> CycleRecord {
        CycleRecord {
            start_date: self
                .start_date
                .clone()
                .unwrap_or_else(loading::default_start_date),
            hours_light: self.hours_light.unwrap_or(DEFAULT_HOURS_LIGHT),
            hours_dark: self.hours_dark.unwrap_or(DEFAULT_HOURS_DARK),
            duration_days: self.duration_days.unwrap_or(DEFAULT_DURATION_DAYS) as f64,
        }
    }

    /// Validate the cycle settings and convert them into an engine configuration.
    pub fn cycle(&self) -> Result<CycleConfig> {
        validation::validate_record(&self.record())
    }

    /// Settings carrying a validated cycle; the refresh interval is kept.
    pub fn with_cycle(&self, cycle: &CycleConfig) -> Self {
        Self {
            start_date: Some(cycle.start.format(EXPORT_DATE_FORMAT).to_string()),
            hours_light: Some(cycle.light_hours),
            hours_dark: Some(cycle.dark_hours),
            duration_days: Some(cycle.duration_days),
            refresh_interval: self.refresh_interval,
        }
    }

    pub fn refresh_interval(&self) -> u64 {
        self.refresh_interval.unwrap_or(DEFAULT_REFRESH_INTERVAL)
    }

    pub fn log_config(&self) {
        let record = self.record();

        log_block_start!("Loaded settings");
        log_indented!("Start: {}", record.start_date);
        log_indented!(
            "Cycle: {}h light / {}h dark",
            record.hours_light,
            record.hours_dark
        );
        log_indented!("Grid: {} days", record.duration_days);
        log_indented!("Refresh interval: {} seconds", self.refresh_interval());
    }
}
