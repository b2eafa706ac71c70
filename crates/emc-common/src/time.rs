//! Date utilities for `yyyymmddhh` analysis times.
//!
//! Hours are counted from 1-Jan-0001. Many datasets use a mixed
//! Julian/Gregorian calendar, while chrono is proleptic Gregorian, so in mixed
//! mode hours are measured from the start of the Gregorian calendar
//! (1582-10-15) and [`HRS_GREG_START`] is added.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{EmcError, EmcResult};

/// Hours from 0001-01-01 to 1582-10-15 in the Julian calendar.
pub const HRS_GREG_START: i64 = 13_865_688;

fn greg_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1582, 10, 15)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

fn day_one() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

fn hours_of(delta: Duration) -> f64 {
    delta.num_seconds() as f64 / 3600.0
}

/// Hours since 1-Jan-0001 for a datetime.
///
/// With `mixed_calendar` the date must not precede 1582-10-15. Without it the
/// count is proleptic Gregorian and includes day one itself, so
/// 0001-01-01 00Z is hour 24.
pub fn dateto_hrs_since_day1ce(date: NaiveDateTime, mixed_calendar: bool) -> EmcResult<f64> {
    if mixed_calendar {
        let start = greg_start();
        if date < start {
            return Err(EmcError::InvalidDate(
                "date must be after start of gregorian calendar (15821015)!".to_string(),
            ));
        }
        Ok(hours_of(date - start) + HRS_GREG_START as f64)
    } else {
        Ok(hours_of(date - day_one()) + 24.0)
    }
}

/// Inverse of [`dateto_hrs_since_day1ce`].
pub fn hrs_since_day1ce_todate(hrs: f64, mixed_calendar: bool) -> EmcResult<NaiveDateTime> {
    if hrs < 0.0 || !hrs.is_finite() {
        return Err(EmcError::InvalidDate("hrs must be positive!".to_string()));
    }
    let (base, offset) = if mixed_calendar {
        (greg_start(), hrs - HRS_GREG_START as f64)
    } else {
        (day_one(), hrs - 24.0)
    };
    let seconds = (offset * 3600.0).round() as i64;
    base.checked_add_signed(Duration::seconds(seconds))
        .ok_or_else(|| EmcError::InvalidDate(format!("{} hours is out of range", hrs)))
}

/// Split a `yyyymmddhh` string into (year, month, day, hour).
pub fn splitdate(yyyymmddhh: &str) -> EmcResult<(i32, u32, u32, u32)> {
    let s = yyyymmddhh.trim();
    if s.len() != 10 || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(EmcError::InvalidDate(format!(
            "expected yyyymmddhh, got '{}'",
            yyyymmddhh
        )));
    }
    let field = |range: std::ops::Range<usize>| -> EmcResult<u32> {
        s[range]
            .parse::<u32>()
            .map_err(|e| EmcError::InvalidDate(format!("{}: {}", yyyymmddhh, e)))
    };
    Ok((field(0..4)? as i32, field(4..6)?, field(6..8)?, field(8..10)?))
}

/// Zero-padded `yyyymmddhh` string.
pub fn makedate(year: i32, month: u32, day: u32, hour: u32) -> String {
    format!("{:04}{:02}{:02}{:02}", year, month, day, hour)
}

/// Parse a `yyyymmddhh` string into a datetime.
pub fn parse_date(yyyymmddhh: &str) -> EmcResult<NaiveDateTime> {
    let (y, m, d, h) = splitdate(yyyymmddhh)?;
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, 0, 0))
        .ok_or_else(|| EmcError::InvalidDate(format!("'{}' is not a calendar date", yyyymmddhh)))
}

fn format_date(dt: NaiveDateTime) -> String {
    makedate(dt.year(), dt.month(), dt.day(), dt.hour())
}

/// Verification date for an analysis date and forecast hour.
pub fn dateshift(analdate: &str, fcsthr: i64) -> EmcResult<String> {
    let dt = parse_date(analdate)?;
    let shifted = dt
        .checked_add_signed(Duration::hours(fcsthr))
        .ok_or_else(|| EmcError::InvalidDate(format!("{} + {}h overflows", analdate, fcsthr)))?;
    Ok(format_date(shifted))
}

/// Date string for a number of hours since 1-Jan-0001.
pub fn hrstodate(hrs: f64, mixed_calendar: bool) -> EmcResult<String> {
    Ok(format_date(hrs_since_day1ce_todate(hrs, mixed_calendar)?))
}

/// Hours since 1-Jan-0001 for a date string.
pub fn datetohrs(yyyymmddhh: &str, mixed_calendar: bool) -> EmcResult<f64> {
    dateto_hrs_since_day1ce(parse_date(yyyymmddhh)?, mixed_calendar)
}

/// Inclusive list of date strings from `date1`, stepping `hrinc` hours.
///
/// Stepping continues while the current date is before `date2`, so the
/// last element may overshoot `date2` when the increment does not divide
/// the span.
pub fn daterange(date1: &str, date2: &str, hrinc: i64) -> EmcResult<Vec<String>> {
    if hrinc <= 0 {
        return Err(EmcError::InvalidArgument(format!(
            "hour increment must be positive, got {}",
            hrinc
        )));
    }
    let end = parse_date(date2)?;
    let mut current = parse_date(date1)?;
    let mut dates = vec![format_date(current)];
    while current < end {
        current += Duration::hours(hrinc);
        dates.push(format_date(current));
    }
    Ok(dates)
}

/// Zero-based day of year (1 January is day 0).
pub fn dayofyear(year: i32, month: u32, day: u32) -> EmcResult<u32> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| EmcError::InvalidDate(format!("{}-{}-{}", year, month, day)))?;
    Ok(date.ordinal0())
}

/// Month and day for a one-based day of the year.
pub fn getyrmon(day_of_year: u32, year: i32) -> EmcResult<(u32, u32)> {
    let days = if is_leap_year(year) { 366 } else { 365 };
    if day_of_year == 0 || day_of_year > days {
        return Err(EmcError::InvalidDate(
            "not that many days in the year".to_string(),
        ));
    }
    let date = NaiveDate::from_yo_opt(year, day_of_year)
        .ok_or_else(|| EmcError::InvalidDate(format!("{}/{}", year, day_of_year)))?;
    Ok((date.month(), date.day()))
}

/// Number of days in a month.
pub fn daysinmonth(year: i32, month: u32) -> EmcResult<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EmcError::InvalidDate(format!("{}-{}", year, month)))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| EmcError::InvalidDate(format!("{}-{}", year, month)))?;
    Ok((next - first).num_days() as u32)
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
