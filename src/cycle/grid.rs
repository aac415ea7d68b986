//! Midnight-aligned day-by-hour grid of phases.
//!
//! Row `d`, column `h` of the grid samples the phase at local midnight of the
//! start date plus `d` days and `h` hours, which works out to
//! `hours_since_start = d * 24 + h - fractional_start_offset`. Cell `(0, 0)` is
//! therefore midnight of the start date, not the start instant itself, and
//! cells before the start instant on day 0 wrap into the previous cycle.
//!
//! Cells are sampled through the same [`hours_between`] path the live status
//! uses, so whenever "now" sits on the top of an hour the highlighted cell and
//! the status indicator report the same phase.

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use super::CycleConfig;
use super::calculations::{hours_between, is_light};

pub const HOURS_PER_DAY: u8 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub day_index: u32,
    pub hour_index: u8,
    pub is_light: bool,
}

/// One calendar day (midnight to midnight) of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub day_index: u32,
    pub date: NaiveDate,
    pub cells: Vec<CalendarCell>,
}

impl CalendarDay {
    /// Number of hour cells that are light.
    pub fn light_hours(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_light).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarGrid {
    pub start_date: NaiveDate,
    pub days: Vec<CalendarDay>,
}

impl CalendarGrid {
    /// Materialize `config.duration_days` rows of 24 cells.
    pub fn build(config: &CycleConfig) -> Self {
        let start_date = config.start.date();
        let days = (0..config.duration_days)
            .map(|day_index| CalendarDay {
                day_index,
                date: start_date + ChronoDuration::days(day_index as i64),
                cells: (0..HOURS_PER_DAY)
                    .map(|hour_index| CalendarCell {
                        day_index,
                        hour_index,
                        is_light: is_light(
                            config,
                            hours_between(config.start, cell_instant(config, day_index, hour_index)),
                        ),
                    })
                    .collect(),
            })
            .collect();

        Self { start_date, days }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn cell(&self, day_index: u32, hour_index: u8) -> Option<&CalendarCell> {
        self.days
            .get(day_index as usize)
            .and_then(|day| day.cells.get(hour_index as usize))
    }

    /// Grid coordinates of `now`, if it falls inside the materialized range.
    pub fn locate(&self, now: NaiveDateTime) -> Option<(u32, u8)> {
        let day_index = (now.date() - self.start_date).num_days();
        if day_index < 0 || day_index >= self.days.len() as i64 {
            return None;
        }
        Some((day_index as u32, now.hour() as u8))
    }

    /// The cell containing `now`.
    pub fn cell_at(&self, now: NaiveDateTime) -> Option<&CalendarCell> {
        self.locate(now)
            .and_then(|(day_index, hour_index)| self.cell(day_index, hour_index))
    }

    pub fn total_light_hours(&self) -> usize {
        self.days.iter().map(CalendarDay::light_hours).sum()
    }
}

/// Wall-clock instant sampled by cell `(day_index, hour_index)`.
pub fn cell_instant(config: &CycleConfig, day_index: u32, hour_index: u8) -> NaiveDateTime {
    config.start.date().and_time(NaiveTime::MIN)
        + ChronoDuration::days(day_index as i64)
        + ChronoDuration::hours(hour_index as i64)
}
