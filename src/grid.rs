//! Month grid: six Monday-first weeks, always 42 cells, so the calendar keeps
//! the same height whatever the month length or starting weekday.

use crate::date::YearMonth;
use chrono::{Datelike, Days, NaiveDate};

pub const GRID_CELLS: usize = 42;
pub const WEEK_LEN: usize = 7;
pub const WEEKDAY_HEADERS: [&str; WEEK_LEN] = ["Lu", "Ma", "Mi", "Ju", "Vi", "Sá", "Do"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day_number: u32,
    /// Belongs to the previous or next month.
    pub is_overflow: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub has_tasks: bool,
}

/// Weekday of the 1st with Monday = 0 ... Sunday = 6.
pub fn first_weekday_index(month: YearMonth) -> usize {
    month.first_day().weekday().num_days_from_monday() as usize
}

pub fn build<F>(
    month: YearMonth,
    today: NaiveDate,
    selected: NaiveDate,
    has_tasks: F,
) -> Vec<DayCell>
where
    F: Fn(NaiveDate) -> bool,
{
    let first = first_weekday_index(month);
    let days = month.days_in_month() as usize;
    let days_in_prev = month.prev().days_in_month() as usize;
    // A valid YearMonth has both neighbours in range, so all 42 days exist.
    let start = month.first_day() - Days::new(first as u64);

    start
        .iter_days()
        .take(GRID_CELLS)
        .enumerate()
        .map(|(i, date)| {
            let (day_number, is_overflow) = if i < first {
                (days_in_prev - first + i + 1, true)
            } else if i >= first + days {
                (i - (first + days) + 1, true)
            } else {
                (i - first + 1, false)
            };
            DayCell {
                date,
                day_number: day_number as u32,
                is_overflow,
                is_today: date == today,
                is_selected: date == selected,
                has_tasks: has_tasks(date),
            }
        })
        .collect()
}

/// Splits a grid into rows of seven.
pub fn weeks(cells: &[DayCell]) -> impl Iterator<Item = &[DayCell]> {
    cells.chunks(WEEK_LEN)
}
