use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month};

use crate::ValidationError;

/// Calendar date of a catalyst, normalized to `YYYY-MM-DD`.
///
/// Source calendars publish dates in wildly different shapes: ISO, US
/// numeric, named months, quarter/half-year estimates, and bare
/// year-months. Coarse estimates resolve to the first day of the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventDate(Date);

impl EventDate {
    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    /// Parse a date string in any of the supported calendar formats.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::UnparseableDate {
                value: input.to_owned(),
            });
        }

        parse_iso(trimmed)
            .or_else(|| parse_us_numeric(trimmed))
            .or_else(|| parse_named_day(trimmed))
            .or_else(|| parse_quarter(trimmed))
            .or_else(|| parse_half(trimmed))
            .or_else(|| parse_year_month(trimmed))
            .or_else(|| parse_named_month(trimmed))
            .map(Self)
            .ok_or_else(|| ValidationError::UnparseableDate {
                value: trimmed.to_owned(),
            })
    }

    pub const fn as_date(self) -> Date {
        self.0
    }

    /// Signed whole days from `reference` to this date (negative = past).
    pub fn days_from(self, reference: Date) -> i64 {
        (self.0 - reference).whole_days()
    }

    /// Absolute day distance between two event dates.
    pub fn distance_days(self, other: Self) -> i64 {
        (self.0 - other.0).whole_days().abs()
    }
}

impl Display for EventDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month() as u8,
            self.0.day()
        )
    }
}

impl Serialize for EventDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EventDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

fn calendar_date(year: i32, month: u8, day: u8) -> Option<Date> {
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `2024-03-15`
fn parse_iso(s: &str) -> Option<Date> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 3 || parts[0].len() != 4 || parts[1].len() != 2 || parts[2].len() != 2 {
        return None;
    }
    if !parts.iter().all(|p| all_digits(p)) {
        return None;
    }
    calendar_date(
        parts[0].parse().ok()?,
        parts[1].parse().ok()?,
        parts[2].parse().ok()?,
    )
}

/// `03/15/2024`, `3-15-2024`, or `1.5.2026` (month first).
fn parse_us_numeric(s: &str) -> Option<Date> {
    let sep = ['/', '-', '.'].into_iter().find(|sep| s.contains(*sep))?;
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3 || parts[2].len() != 4 {
        return None;
    }
    if !parts.iter().all(|p| all_digits(p)) || parts[0].len() > 2 || parts[1].len() > 2 {
        return None;
    }
    calendar_date(
        parts[2].parse().ok()?,
        parts[0].parse().ok()?,
        parts[1].parse().ok()?,
    )
}

/// `March 15, 2024` or `Mar 15 2024`
fn parse_named_day(s: &str) -> Option<Date> {
    let cleaned = s.replace(',', " ");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    if parts.len() != 3 {
        return None;
    }
    let month = month_from_name(parts[0])?;
    if !all_digits(parts[1]) || parts[2].len() != 4 || !all_digits(parts[2]) {
        return None;
    }
    Date::from_calendar_date(parts[2].parse().ok()?, month, parts[1].parse().ok()?).ok()
}

/// `Q1 2024` resolves to the first day of the quarter.
fn parse_quarter(s: &str) -> Option<Date> {
    let rest = s.strip_prefix('Q').or_else(|| s.strip_prefix('q'))?;
    let (quarter, year) = split_period(rest)?;
    if !(1..=4).contains(&quarter) {
        return None;
    }
    calendar_date(year, (quarter - 1) * 3 + 1, 1)
}

/// `H1 2024` resolves to January 1; `H2` to July 1.
fn parse_half(s: &str) -> Option<Date> {
    let rest = s.strip_prefix('H').or_else(|| s.strip_prefix('h'))?;
    let (half, year) = split_period(rest)?;
    match half {
        1 => calendar_date(year, 1, 1),
        2 => calendar_date(year, 7, 1),
        _ => None,
    }
}

fn split_period(rest: &str) -> Option<(u8, i32)> {
    let rest = rest.trim_start();
    let (digit, year) = rest.split_at(rest.len().min(1));
    if !all_digits(digit) {
        return None;
    }
    let year = year.trim();
    if year.len() != 4 || !all_digits(year) {
        return None;
    }
    Some((digit.parse().ok()?, year.parse().ok()?))
}

/// `2024-03` resolves to the first of the month.
fn parse_year_month(s: &str) -> Option<Date> {
    let (year, month) = s.split_once('-')?;
    if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
        return None;
    }
    calendar_date(year.parse().ok()?, month.parse().ok()?, 1)
}

/// `March 2024` resolves to the first of the month.
fn parse_named_month(s: &str) -> Option<Date> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 2 {
        return None;
    }
    let month = month_from_name(parts[0])?;
    if parts[1].len() != 4 || !all_digits(parts[1]) {
        return None;
    }
    Date::from_calendar_date(parts[1].parse().ok()?, month, 1).ok()
}

fn month_from_name(name: &str) -> Option<Month> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.as_str() {
        "january" | "jan" => Month::January,
        "february" | "feb" => Month::February,
        "march" | "mar" => Month::March,
        "april" | "apr" => Month::April,
        "may" => Month::May,
        "june" | "jun" => Month::June,
        "july" | "jul" => Month::July,
        "august" | "aug" => Month::August,
        "september" | "sep" | "sept" => Month::September,
        "october" | "oct" => Month::October,
        "november" | "nov" => Month::November,
        "december" | "dec" => Month::December,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_parses(input: &str, expected: &str) {
        let parsed = EventDate::parse(input).expect("date should parse");
        assert_eq!(parsed.to_string(), expected, "input: {input}");
    }

    #[test]
    fn parses_iso_date() {
        assert_parses("2024-03-15", "2024-03-15");
    }

    #[test]
    fn parses_us_numeric_variants() {
        assert_parses("03/15/2024", "2024-03-15");
        assert_parses("3/5/2024", "2024-03-05");
        assert_parses("1.5.2026", "2026-01-05");
    }

    #[test]
    fn parses_named_day() {
        assert_parses("March 15, 2024", "2024-03-15");
        assert_parses("Feb 1 2026", "2026-02-01");
    }

    #[test]
    fn parses_quarter_and_half() {
        assert_parses("Q1 2024", "2024-01-01");
        assert_parses("Q3 2024", "2024-07-01");
        assert_parses("H2 2025", "2025-07-01");
    }

    #[test]
    fn parses_year_month_variants() {
        assert_parses("2024-03", "2024-03-01");
        assert_parses("March 2024", "2024-03-01");
    }

    #[test]
    fn rejects_garbage() {
        let err = EventDate::parse("mid next year").expect_err("must fail");
        assert!(matches!(err, ValidationError::UnparseableDate { .. }));
    }

    #[test]
    fn rejects_impossible_calendar_date() {
        let err = EventDate::parse("2024-02-31").expect_err("must fail");
        assert!(matches!(err, ValidationError::UnparseableDate { .. }));
    }

    #[test]
    fn computes_day_distances() {
        let a = EventDate::parse("2024-03-15").expect("must parse");
        let b = EventDate::parse("2024-03-18").expect("must parse");
        assert_eq!(a.distance_days(b), 3);
        assert_eq!(b.days_from(a.as_date()), 3);
        assert_eq!(a.days_from(b.as_date()), -3);
    }
}
