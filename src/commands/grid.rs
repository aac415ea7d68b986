//! Grid command - render the day-by-hour phase grid.
//!
//! Each row is one calendar day (midnight to midnight) from the start date,
//! each column one hour. The cell containing "now" is highlighted so the grid
//! can be checked against `photoperiod status` at a glance.

use anyhow::Result;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use serde_json::json;

use crate::config::Config;
use crate::cycle::grid::HOURS_PER_DAY;
use crate::cycle::{CalendarGrid, CycleConfig};
use crate::time_source;

const LIGHT_GLYPH: char = '█';
const DARK_GLYPH: char = '·';
const CURRENT_LIGHT_GLYPH: char = '◆';
const CURRENT_DARK_GLYPH: char = '◇';

/// Handle the grid command.
///
/// # Arguments
/// * `json` - Output the grid in JSON format
/// * `days` - Override `durationDays` for this invocation
pub fn handle_grid_command(json: bool, days: Option<u32>) -> Result<()> {
    let config = Config::load()?;
    let mut cycle = config.cycle()?;
    if let Some(days) = days {
        cycle = cycle.with_duration_days(days);
    }

    let grid = CalendarGrid::build(&cycle);
    let now = time_source::now();

    if json {
        println!("{}", serde_json::to_string_pretty(&grid_json(&grid, &cycle, now))?);
        return Ok(());
    }

    let color = std::io::stdout().is_tty();
    print!("{}", render_grid(&grid, grid.locate(now), color));
    Ok(())
}

/// JSON document for `grid --json`: one string of `L`/`D` per day.
pub fn grid_json(
    grid: &CalendarGrid,
    cycle: &CycleConfig,
    now: chrono::NaiveDateTime,
) -> serde_json::Value {
    let days: Vec<_> = grid
        .days
        .iter()
        .map(|day| {
            json!({
                "date": day.date.format("%Y-%m-%d").to_string(),
                "hours": day
                    .cells
                    .iter()
                    .map(|cell| if cell.is_light { 'L' } else { 'D' })
                    .collect::<String>(),
                "lightHours": day.light_hours(),
            })
        })
        .collect();

    json!({
        "startDate": cycle.start.format(crate::constants::EXPORT_DATE_FORMAT).to_string(),
        "hoursLight": cycle.light_hours,
        "hoursDark": cycle.dark_hours,
        "durationDays": cycle.duration_days,
        "current": grid.locate(now).map(|(day, hour)| json!({ "day": day, "hour": hour })),
        "days": days,
    })
}

/// Render the grid as text, one line per day plus a header.
///
/// With `color` the cells are styled through crossterm; without it the
/// output is plain and suitable for pipes.
pub fn render_grid(grid: &CalendarGrid, current: Option<(u32, u8)>, color: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<12}", "Date"));
    for hour in (0..HOURS_PER_DAY).step_by(6) {
        out.push_str(&format!("{:<6}", hour));
    }
    out.push_str(" Light\n");

    for day in &grid.days {
        out.push_str(&format!("{:<12}", day.date.format("%Y-%m-%d").to_string()));

        for cell in &day.cells {
            let is_current = current == Some((cell.day_index, cell.hour_index));
            let glyph = match (cell.is_light, is_current) {
                (true, false) => LIGHT_GLYPH,
                (false, false) => DARK_GLYPH,
                (true, true) => CURRENT_LIGHT_GLYPH,
                (false, true) => CURRENT_DARK_GLYPH,
            };

            if color {
                let styled = if cell.is_light {
                    glyph.to_string().yellow()
                } else {
                    glyph.to_string().dark_blue()
                };
                let styled = if is_current { styled.bold().reverse() } else { styled };
                out.push_str(&styled.to_string());
            } else {
                out.push(glyph);
            }
        }

        out.push_str(&format!(" {:>4}h\n", day.light_hours()));
    }

    out
}

/// Display help for the grid command.
pub fn display_help() {
    log_version!();
    log_block_start!("grid - Display the day-by-hour phase grid");
    log_block_start!("Usage: photoperiod grid [--json] [--days <n>]");
    log_block_start!("Description:");
    log_indented!("One row per calendar day from the start date, one column per hour.");
    log_indented!("Each cell shows the phase at the top of its hour:");
    log_indented!("{LIGHT_GLYPH} light   {DARK_GLYPH} dark   {CURRENT_LIGHT_GLYPH}/{CURRENT_DARK_GLYPH} the current hour");
    log_block_start!("Options:");
    log_indented!("-j, --json        Output the grid in JSON format");
    log_indented!("-n, --days <n>    Number of days to show (1-9999, default durationDays)");
    log_block_start!("Examples:");
    log_indented!("photoperiod grid");
    log_indented!("photoperiod grid --days 30");
    log_indented!("photoperiod grid --json");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::parse_datetime;

    fn cycle(start: &str, light: f64, dark: f64, days: u32) -> CycleConfig {
        CycleConfig::new(parse_datetime(start).unwrap(), light, dark, days)
    }

    #[test]
    fn test_render_plain_grid() {
        let cycle = cycle("2024-01-01T00:00", 12.0, 12.0, 2);
        let grid = CalendarGrid::build(&cycle);
        let text = render_grid(&grid, Some((1, 13)), false);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Date        0     6     12    18"));
        assert_eq!(lines[1], "2024-01-01  ████████████············   12h");
        assert_eq!(lines[2], "2024-01-02  ████████████·◇··········   12h");
    }

    #[test]
    fn test_grid_json_marks_current_cell() {
        let cycle = cycle("2024-01-01T06:00", 12.0, 12.0, 1);
        let grid = CalendarGrid::build(&cycle);
        let value = grid_json(&grid, &cycle, parse_datetime("2024-01-01T07:15").unwrap());

        assert_eq!(value["current"]["day"], 0);
        assert_eq!(value["current"]["hour"], 7);
        assert_eq!(value["days"][0]["hours"], "DDDDDDLLLLLLLLLLLLDDDDDD");
        assert_eq!(value["days"][0]["lightHours"], 12);
        assert_eq!(value["durationDays"], 1);
    }

    #[test]
    fn test_grid_json_outside_range_has_no_current_cell() {
        let cycle = cycle("2024-01-01T00:00", 12.0, 12.0, 1);
        let grid = CalendarGrid::build(&cycle);
        let value = grid_json(&grid, &cycle, parse_datetime("2024-02-01T00:00").unwrap());
        assert!(value["current"].is_null());
    }
}
