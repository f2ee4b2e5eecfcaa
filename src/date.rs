use chrono::{Datelike, Days, Local, Months, NaiveDate};
use std::fmt;

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// A calendar month. The day component is never stored.
///
/// Only months whose previous and next months chrono can also represent are
/// valid, so a six-week grid around any `YearMonth` never leaves the date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).and_then(Self::from_first)
    }

    fn from_first(first: NaiveDate) -> Option<Self> {
        first.checked_sub_months(Months::new(1))?;
        first.checked_add_months(Months::new(1))?;
        Some(YearMonth { first })
    }

    /// Month containing `date`. The first and last months chrono can
    /// represent clamp to their inner neighbour.
    pub fn of(date: NaiveDate) -> Self {
        let first = date - Days::new(u64::from(date.day0()));
        if let Some(month) = Self::from_first(first) {
            return month;
        }
        let first = if first.checked_sub_months(Months::new(1)).is_none() {
            first + Months::new(1)
        } else {
            first - Months::new(1)
        };
        YearMonth { first }
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    /// 1-based, 1..=12
    pub fn month(self) -> u32 {
        self.first.month()
    }

    /// Previous month, or `self` at the start of the supported range.
    pub fn prev(self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .and_then(Self::from_first)
            .unwrap_or(self)
    }

    /// Next month, or `self` at the end of the supported range.
    pub fn next(self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .and_then(Self::from_first)
            .unwrap_or(self)
    }

    /// Day `day` of this month, if it exists.
    pub fn day(self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(self) -> u32 {
        match self.month() {
            2 if NaiveDate::from_ymd_opt(self.year(), 2, 29).is_some() => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (year, month) = raw.trim().split_once('-')?;
        if month.len() != 2 {
            return None;
        }
        YearMonth::new(year.parse().ok()?, month.parse().ok()?)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Canonical `YYYY-MM-DD` key for a calendar date.
pub fn to_iso_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Strict inverse of [`to_iso_date`]. Empty or malformed input gives `None`.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Reorders `YYYY-MM-DD` into `DD/MM/YYYY` for display.
pub fn format_localized(iso: &str) -> String {
    let mut parts = iso.splitn(3, '-');
    let y = parts.next().unwrap_or_default();
    let m = parts.next().unwrap_or_default();
    let d = parts.next().unwrap_or_default();
    format!("{}/{}/{}", d, m, y)
}

/// `"Junio 2025"`
pub fn month_label(month: YearMonth) -> String {
    let idx = (month.month() - 1) as usize;
    format!("{} {}", MONTH_NAMES[idx], month.year())
}

/// Source of "now" for everything that needs the current day or instant.
///
/// Dates are always taken from the local calendar.
pub trait Clock {
    fn today(&self) -> NaiveDate;
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Local::now().timestamp_millis()
    }
}

/// A clock that never moves.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub today: NaiveDate,
    pub millis: i64,
}

impl FixedClock {
    pub fn on(today: NaiveDate) -> Self {
        let millis = today
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or_default();
        FixedClock { today, millis }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_millis(&self) -> i64 {
        self.millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn iso_is_zero_padded() {
        assert_eq!(to_iso_date(ymd(2025, 3, 7)), "2025-03-07");
        assert_eq!(to_iso_date(ymd(987, 12, 31)), "0987-12-31");
    }

    #[test]
    fn localized_reorders_components() {
        let date = ymd(2025, 6, 15);
        let shown = format_localized(&to_iso_date(date));
        assert_eq!(shown, "15/06/2025");
        let back = NaiveDate::parse_from_str(&shown, "%d/%m/%Y").unwrap();
        assert_eq!(back, date);
    }

    #[test]
    fn localized_tolerates_garbage() {
        assert_eq!(format_localized("nope"), "//nope");
        assert_eq!(format_localized(""), "//");
    }

    #[test]
    fn parse_rejects_loose_input() {
        assert_eq!(parse_iso_date("2025-06-15"), Some(ymd(2025, 6, 15)));
        assert_eq!(parse_iso_date(" 2025-06-15 "), Some(ymd(2025, 6, 15)));
        assert_eq!(parse_iso_date(""), None);
        assert_eq!(parse_iso_date("2025-6-15"), None);
        assert_eq!(parse_iso_date("2025-02-30"), None);
    }

    #[test]
    fn month_labels_use_the_spanish_table() {
        assert_eq!(month_label(ym(2025, 1)), "Enero 2025");
        assert_eq!(month_label(ym(2024, 12)), "Diciembre 2024");
    }

    #[test]
    fn months_roll_over_years() {
        let jan = ym(2025, 1);
        assert_eq!(jan.prev(), ym(2024, 12));
        assert_eq!(jan.prev().next(), jan);
        let dec = ym(2025, 12);
        assert_eq!(dec.next(), ym(2026, 1));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(ym(2024, 2).days_in_month(), 29);
        assert_eq!(ym(2025, 2).days_in_month(), 28);
        assert_eq!(ym(1900, 2).days_in_month(), 28);
        assert_eq!(ym(2025, 12).days_in_month(), 31);
        assert_eq!(ym(2025, 4).days_in_month(), 30);
    }

    #[test]
    fn year_month_parses_and_displays() {
        let june = YearMonth::parse("2025-06").unwrap();
        assert_eq!(june, ym(2025, 6));
        assert_eq!(june.to_string(), "2025-06");
        assert_eq!(YearMonth::parse("2025-13"), None);
        assert_eq!(YearMonth::parse("2025-6"), None);
    }

    #[test]
    fn months_without_both_neighbours_are_rejected() {
        let (min_year, max_year) = (NaiveDate::MIN.year(), NaiveDate::MAX.year());
        assert_eq!(YearMonth::new(min_year, 1), None);
        assert_eq!(YearMonth::new(max_year, 12), None);
        assert_eq!(YearMonth::parse(&format!("{}-12", max_year)), None);

        let earliest = ym(min_year, 2);
        let latest = ym(max_year, 11);
        assert_eq!(earliest.prev(), earliest);
        assert_eq!(latest.next(), latest);
        assert_eq!(latest.days_in_month(), 30);
        assert_eq!(YearMonth::of(NaiveDate::MIN), earliest);
        assert_eq!(YearMonth::of(NaiveDate::MAX), latest);
    }
}
