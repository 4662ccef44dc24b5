//! Calendar strings <-> ephemeris time.
//!
//! Ephemeris time here is seconds past 2000-01-01 12:00:00, read on the UTC
//! calendar. Leap seconds and the TDB-UTC offset are not modeled; the
//! analytic kernels are nowhere near accurate enough for that to matter.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use super::EphemerisError;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarFormat {
    /// `2018 OCT 01 00:00:00`
    Calendar,
    /// `20181001000000`
    Compact,
    /// `2018-10-01T00:00:00`
    Iso,
}

const DATE_TIME_FORMATS: [&str; 5] = [
    "%Y%m%d%H%M%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y %b %d %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y%m%d", "%Y-%m-%d", "%Y %b %d", "%b %d, %Y"];

fn j2000() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("J2000 is a valid date")
}

/// Parses the calendar formats we accept for configuration and CLI input,
/// e.g. `Oct 1, 2018`, `20181001`, `2018 OCT 01 00:00:00` or
/// `2018-10-01T06:30:00`. Month names are case-insensitive.
pub fn parse_calendar(date: &str) -> Result<f64, EphemerisError> {
    let trimmed = date.trim();
    let invalid = || EphemerisError::InvalidEpoch(date.to_owned());

    let date_time = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(invalid)?;

    Ok(seconds_since_j2000(date_time))
}

fn seconds_since_j2000(date_time: NaiveDateTime) -> f64 {
    let delta = date_time - j2000();
    // Whole seconds plus the sub-second remainder, to keep precision far from J2000
    delta.num_seconds() as f64 + delta.subsec_nanos() as f64 * 1e-9
}

pub fn to_date_time(time: f64) -> Option<NaiveDateTime> {
    if !time.is_finite() {
        return None;
    }
    let delta = TimeDelta::try_seconds(time.round() as i64)?;
    j2000().checked_add_signed(delta)
}

/// Formats an ephemeris time, rounded to the nearest second. Times outside
/// the calendar's range are printed as raw seconds.
pub fn format_calendar(time: f64, format: CalendarFormat) -> String {
    let date_time = match to_date_time(time) {
        Some(dt) => dt,
        None => return format!("{} ET", time),
    };
    match format {
        CalendarFormat::Calendar => date_time
            .format("%Y %b %d %H:%M:%S")
            .to_string()
            .to_uppercase(),
        CalendarFormat::Compact => date_time.format("%Y%m%d%H%M%S").to_string(),
        CalendarFormat::Iso => date_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
    }
}

/// `count` evenly spaced times from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
