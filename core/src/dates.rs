use chrono::{Datelike, NaiveDate};

use crate::errors::{SkyscoutError, SkyscoutResult};

/// Parses a short-form "MM/DD" string into its numeric components.
fn parse_month_day(input: &str) -> SkyscoutResult<(u32, u32)> {
    let trimmed = input.trim();
    let (month_str, day_str) = trimmed
        .split_once('/')
        .ok_or_else(|| SkyscoutError::InvalidDateFormat(trimmed.to_string()))?;

    let month: u32 = month_str
        .trim()
        .parse()
        .map_err(|_| SkyscoutError::InvalidDateFormat(trimmed.to_string()))?;
    let day: u32 = day_str
        .trim()
        .parse()
        .map_err(|_| SkyscoutError::InvalidDateFormat(trimmed.to_string()))?;

    Ok((month, day))
}

fn date_in_year(year: i32, month: u32, day: u32) -> SkyscoutResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| SkyscoutError::InvalidCalendarDate(format!("{:02}/{:02}", month, day)))
}

/// Normalizes a departure date given in "MM/DD" form.
///
/// Uses the current year unless that date has already passed relative to
/// `today`, in which case next year is used. Comparison is on the local
/// calendar date only.
pub fn normalize_departure(input: &str, today: NaiveDate) -> SkyscoutResult<NaiveDate> {
    let (month, day) = parse_month_day(input)?;
    let candidate = date_in_year(today.year(), month, day)?;

    if candidate < today {
        date_in_year(today.year() + 1, month, day)
    } else {
        Ok(candidate)
    }
}

/// Normalizes a return date given in "MM/DD" form against a departure date.
///
/// Starts in the departure year; if the result is not strictly after the
/// departure, retries with the following year before giving up.
pub fn normalize_return(input: &str, departure: NaiveDate) -> SkyscoutResult<NaiveDate> {
    let (month, day) = parse_month_day(input)?;
    let candidate = date_in_year(departure.year(), month, day)?;

    if candidate > departure {
        return Ok(candidate);
    }

    let next_year = date_in_year(departure.year() + 1, month, day)?;
    if next_year > departure {
        Ok(next_year)
    } else {
        Err(SkyscoutError::ReturnBeforeDeparture {
            departure: departure.to_string(),
            attempted: next_year.to_string(),
        })
    }
}
