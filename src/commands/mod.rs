//! Command-line command handlers for photoperiod.
//!
//! Each command is implemented in its own submodule. Commands that read the
//! settings go through [`crate::config::Config::load`], so the settings file
//! is created on first use and validated before anything is printed.

pub mod export;
pub mod get;
pub mod grid;
pub mod help;
pub mod import;
pub mod set;
pub mod simulate;
pub mod status;

use crate::config::FIELD_NAMES;

/// Calculate Levenshtein distance between two strings for similarity matching
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut previous: Vec<usize> = (0..=len2).collect();
    let mut current = vec![0; len2 + 1];

    for i in 1..=len1 {
        current[0] = i;
        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);
            current[j] = (previous[j] + 1) // deletion
                .min(current[j - 1] + 1) // insertion
                .min(previous[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[len2]
}

/// The settings field closest to an unknown name, if any is reasonably close.
pub(crate) fn suggest_field(unknown: &str) -> Option<&'static str> {
    let target = unknown.to_lowercase();
    FIELD_NAMES
        .iter()
        .map(|field| (*field, levenshtein_distance(&target, &field.to_lowercase())))
        .filter(|(_, distance)| *distance <= 4)
        .min_by_key(|(_, distance)| *distance)
        .map(|(field, _)| field)
}

/// Log an unknown field with a suggestion and the list of valid fields.
pub(crate) fn report_unknown_field(field: &str) {
    log_pipe!();
    log_error!("Unknown configuration field: '{}'", field);
    if let Some(closest) = suggest_field(field) {
        log_indented!("Did you mean '{}'?", closest);
    }
    log_block_start!("Available fields:");
    log_indented!("{}", FIELD_NAMES.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("hoursdark", "hoursdark"), 0);
    }

    #[test]
    fn test_suggest_field() {
        assert_eq!(suggest_field("hoursLite"), Some("hoursLight"));
        assert_eq!(suggest_field("startdat"), Some("startDate"));
        assert_eq!(suggest_field("temperature"), None);
    }
}
