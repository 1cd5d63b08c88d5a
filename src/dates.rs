//! Date parsing and small numeric helpers shared by the client and analyzer.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::ValidationError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Weekday names in Sunday-first order, matching [`weekday_index`].
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// chrono accepts unpadded numeric fields, so the shape is checked first;
/// `2025-9-5` is rejected even though chrono would parse it.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    if !has_date_shape(input) {
        return Err(ValidationError::InvalidDate(input.to_string()));
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

fn has_date_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter()
            .enumerate()
            .all(|(i, c)| if i == 4 || i == 7 { *c == b'-' } else { c.is_ascii_digit() })
}

/// Parse a strict `YYYY-MM` month, returning `(year, month)`.
pub fn parse_month(input: &str) -> Result<(i32, u32), ValidationError> {
    let b = input.as_bytes();
    let shaped = b.len() == 7
        && b.iter()
            .enumerate()
            .all(|(i, c)| if i == 4 { *c == b'-' } else { c.is_ascii_digit() });
    if !shaped {
        return Err(ValidationError::InvalidMonth(input.to_string()));
    }
    let year: i32 = input[..4]
        .parse()
        .map_err(|_| ValidationError::InvalidMonth(input.to_string()))?;
    let month: u32 = input[5..]
        .parse()
        .map_err(|_| ValidationError::InvalidMonth(input.to_string()))?;
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidMonth(input.to_string()));
    }
    Ok((year, month))
}

/// `YYYY-MM` key for the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// `YYYY-MM` key for the given year and month.
pub fn format_month(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// The calendar month immediately before `(year, month)`.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Number of days in `date`'s month.
pub fn days_in_month(date: NaiveDate) -> u32 {
    match date.month() {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(date.year(), 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

/// Monday of the week containing `date`.
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sunday-first weekday index: Sunday = 0 … Saturday = 6.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
