//! Configuration file building and in-place editing.
//!
//! New settings files are generated through [`ConfigBuilder`], which keeps the
//! trailing comments aligned. Existing files are edited line by line so user
//! comments and spacing survive `set` and `import`.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use super::loading::private_path;
use super::{Config, FIELD_NAMES, snake_case_field};
use crate::constants::*;

/// Create a default settings file at `path`, starting today at midnight.
pub fn create_default_config(path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let config = Config {
        start_date: Some(super::loading::default_start_date()),
        hours_light: Some(DEFAULT_HOURS_LIGHT),
        hours_dark: Some(DEFAULT_HOURS_DARK),
        duration_days: Some(DEFAULT_DURATION_DAYS),
        refresh_interval: Some(DEFAULT_REFRESH_INTERVAL),
    };

    fs::write(path, render_config(&config))
        .with_context(|| format!("Failed to write default config to {}", private_path(path)))?;

    log_block_start!("Created default configuration");
    log_indented!("{}", private_path(path));

    Ok(())
}

/// Persist `config` to `path`.
///
/// An existing file keeps its comments and layout: known keys are rewritten
/// in place and missing keys appended. A missing file is generated fresh.
pub fn write_config(path: &PathBuf, config: &Config) -> Result<()> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        return fs::write(path, render_config(config))
            .with_context(|| format!("Failed to write config to {}", private_path(path)));
    }

    let mut content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    for field in FIELD_NAMES {
        if let Some(value) = format_field(config, field) {
            content = update_field_in_content(&content, field, &value);
        }
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write config to {}", private_path(path)))
}

/// TOML literal for one field of `config`, or `None` when unset.
pub fn format_field(config: &Config, field: &str) -> Option<String> {
    match field {
        "startDate" => config
            .start_date
            .as_ref()
            .map(|date| toml::Value::String(date.clone()).to_string()),
        "hoursLight" => config.hours_light.map(|hours| hours.to_string()),
        "hoursDark" => config.hours_dark.map(|hours| hours.to_string()),
        "durationDays" => config.duration_days.map(|days| days.to_string()),
        "refreshInterval" => config.refresh_interval.map(|secs| secs.to_string()),
        _ => None,
    }
}

/// A fully commented settings file for `config`; unset fields get defaults.
pub fn render_config(config: &Config) -> String {
    let record = config.record();
    let value = |field: &str| format_field(config, field);

    let mut content = ConfigBuilder::new()
        .add_section("Cycle")
        .add_setting(
            "startDate",
            &value("startDate")
                .unwrap_or_else(|| toml::Value::String(record.start_date.clone()).to_string()),
            "When the first light phase begins (YYYY-MM-DDTHH:MM[:SS])",
        )
        .add_setting(
            "hoursLight",
            &value("hoursLight").unwrap_or_else(|| record.hours_light.to_string()),
            "Hours of light per cycle (0 or more)",
        )
        .add_setting(
            "hoursDark",
            &value("hoursDark").unwrap_or_else(|| record.hours_dark.to_string()),
            "Hours of dark per cycle (0 or more)",
        )
        .add_setting(
            "durationDays",
            &value("durationDays").unwrap_or_else(|| record.duration_days.to_string()),
            &format!("Days shown in the grid ({MINIMUM_DURATION_DAYS}-{MAXIMUM_DURATION_DAYS})"),
        )
        .add_section("Live view")
        .add_setting(
            "refreshInterval",
            &value("refreshInterval").unwrap_or_else(|| config.refresh_interval().to_string()),
            &format!(
                "Seconds between status refreshes ({MINIMUM_REFRESH_INTERVAL}-{MAXIMUM_REFRESH_INTERVAL})"
            ),
        )
        .build();

    content.push('\n');
    content
}

/// Builder for creating dynamically-aligned configuration files.
///
/// This builder maintains proper comment alignment by calculating the maximum
/// width of all setting lines and applying consistent padding.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

#[derive(Clone)]
struct ConfigEntry {
    content: String,
    entry_type: EntryType,
}

#[derive(Clone)]
enum EntryType {
    Section,
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry {
            content: format!("#[{title}]"),
            entry_type: EntryType::Section,
        });
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        let line = format!("{key} = {value}");
        self.entries.push(ConfigEntry {
            content: line.clone(),
            entry_type: EntryType::Setting {
                line,
                comment: format!("# {comment}"),
            },
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match &entry.entry_type {
                EntryType::Setting { line, .. } => Some(line.len()),
                EntryType::Section => None,
            })
            .max()
            .unwrap_or(0)
            + 1; // one space between setting and comment

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry.entry_type {
                EntryType::Section => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(entry.content);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.join("\n")
    }
}

/// Find the uncommented line assigning exactly `key`.
pub(crate) fn find_config_line(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .find(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with('#')
                && trimmed
                    .split_once('=')
                    .is_some_and(|(name, _)| name.trim() == key)
        })
        .map(str::to_string)
}

/// Preserve the original comment formatting when updating a config line value.
///
/// This function maintains the exact spacing that was between the value and comment
/// in the original line, preserving tabs, spaces, or any combination thereof.
pub(crate) fn preserve_comment_formatting(
    original_line: &str,
    key: &str,
    new_value: &str,
) -> String {
    let indent_len = original_line.len() - original_line.trim_start().len();
    let key_value_part = format!("{}{key} = {new_value}", &original_line[..indent_len]);

    if let Some(comment_pos) = comment_start(original_line) {
        let comment_part = &original_line[comment_pos..];

        let before_comment = &original_line[..comment_pos];
        let original_spacing =
            if let Some(last_non_space) = before_comment.rfind(|c: char| !c.is_whitespace()) {
                &before_comment[last_non_space + 1..]
            } else {
                " "
            };

        format!("{key_value_part}{original_spacing}{comment_part}")
    } else {
        key_value_part
    }
}

/// Byte offset of a trailing `#` comment, ignoring `#` inside quoted values.
fn comment_start(line: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (index, c) in line.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, '#') => return Some(index),
            _ => {}
        }
    }
    None
}

/// Rewrite `field` in `content`, keeping its comment; append it when absent.
///
/// A snake_case spelling of the key already in the file is updated in place
/// rather than duplicated.
pub(crate) fn update_field_in_content(content: &str, field: &str, value: &str) -> String {
    let snake = snake_case_field(field);
    let existing = find_config_line(content, field)
        .map(|line| (line, field.to_string()))
        .or_else(|| find_config_line(content, &snake).map(|line| (line, snake.clone())));

    if let Some((line, key)) = existing {
        let new_line = preserve_comment_formatting(&line, &key, value);
        content
            .lines()
            .map(|current| if current == line { new_line.as_str() } else { current })
            .collect::<Vec<_>>()
            .join("\n")
            + if content.ends_with('\n') { "\n" } else { "" }
    } else {
        let mut updated = content.to_string();
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(&format!("{field} = {value}\n"));
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_line_matches_whole_key() {
        let content = "#[Cycle]\nhoursLightExtra = 3\nhoursLight = 12 # light\n";
        assert_eq!(
            find_config_line(content, "hoursLight"),
            Some("hoursLight = 12 # light".to_string())
        );
        assert_eq!(find_config_line(content, "hours"), None);
    }

    #[test]
    fn test_find_config_line_skips_comments() {
        let content = "# hoursDark = 3\nhoursDark=10\n";
        assert_eq!(
            find_config_line(content, "hoursDark"),
            Some("hoursDark=10".to_string())
        );
    }

    #[test]
    fn test_preserve_comment_formatting() {
        let line = "hoursLight = 12      # Hours of light";
        assert_eq!(
            preserve_comment_formatting(line, "hoursLight", "16"),
            "hoursLight = 16      # Hours of light"
        );
        assert_eq!(
            preserve_comment_formatting("hoursLight = 12", "hoursLight", "8"),
            "hoursLight = 8"
        );
    }

    #[test]
    fn test_hash_inside_quoted_value_is_not_a_comment() {
        let line = "startDate = \"2024#01\"  # start";
        assert_eq!(comment_start(line), Some(23));
    }

    #[test]
    fn test_update_field_in_content_appends_missing_key() {
        let updated = update_field_in_content("hoursLight = 12", "hoursDark", "6");
        assert_eq!(updated, "hoursLight = 12\nhoursDark = 6\n");
    }

    #[test]
    fn test_update_field_in_content_rewrites_snake_case_key() {
        let content = "hours_dark = 12 # dark\n";
        assert_eq!(
            update_field_in_content(content, "hoursDark", "9.5"),
            "hours_dark = 9.5 # dark\n"
        );
    }

    #[test]
    fn test_render_config_aligns_comments() {
        let content = render_config(&Config {
            start_date: Some("2024-01-01T00:00:00".to_string()),
            ..Default::default()
        });
        let columns: Vec<usize> = content
            .lines()
            .filter(|line| !line.starts_with('#') && !line.is_empty())
            .map(|line| line.find('#').unwrap())
            .collect();
        assert_eq!(columns.len(), 5);
        assert!(columns.iter().all(|col| *col == columns[0]));

        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.start_date.as_deref(), Some("2024-01-01T00:00:00"));
        assert_eq!(parsed.hours_light, Some(12.0));
        assert_eq!(parsed.duration_days, Some(DEFAULT_DURATION_DAYS));
        assert_eq!(parsed.refresh_interval, Some(DEFAULT_REFRESH_INTERVAL));
    }
}
