//! Date and time utilities
//!
//! Parsing for listing start times, user-supplied times of day and date range
//! expressions (`today`, `friday`, `next movie week`, `2024-01-05 to
//! 2024-01-07`, ...).

use crate::{Error, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, Utc, Weekday};

/// Movie weeks open on Friday and close the following Thursday
const MOVIE_WEEK_START: Weekday = Weekday::Fri;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidInput(format!(
                "date range ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// Every day in the range, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }
}

/// Parse a listing start time such as `7:30pm` or `10:05a`
pub fn parse_showtime(raw: &str) -> Result<NaiveTime> {
    let mut normalized = raw.trim().to_lowercase();
    if normalized.ends_with('a') || normalized.ends_with('p') {
        normalized.push('m');
    }

    NaiveTime::parse_from_str(&normalized, "%I:%M%p")
        .map_err(|_| Error::InvalidStartTime(raw.to_string()))
}

/// Parse a user-supplied time of day (`7pm`, `7:30pm`, `7p`, `19:30`)
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    let mut normalized = value.trim().to_lowercase().replace(' ', "");
    if normalized.ends_with('a') || normalized.ends_with('p') {
        normalized.push('m');
    }

    let parsed = if normalized.ends_with("am") || normalized.ends_with("pm") {
        if normalized.contains(':') {
            NaiveTime::parse_from_str(&normalized, "%I:%M%p")
        } else {
            let (hour, meridiem) = normalized.split_at(normalized.len() - 2);
            NaiveTime::parse_from_str(&format!("{}:00{}", hour, meridiem), "%I:%M%p")
        }
    } else {
        NaiveTime::parse_from_str(&normalized, "%H:%M")
    };

    parsed.map_err(|_| Error::InvalidInput(format!("unrecognized time of day: {:?}", value)))
}

/// Parse a date range expression relative to `today`
///
/// A single date expression yields a one-day range. Two expressions joined by
/// `to` yield an inclusive range. `this movie week` / `next movie week`
/// expand to a Friday-Thursday span.
pub fn parse_date_range(expr: &str, today: NaiveDate) -> Result<DateRange> {
    let expr = expr.trim().to_lowercase();

    match expr.as_str() {
        "this movie week" => return Ok(movie_week_containing(today)),
        "next movie week" => {
            let this_week = movie_week_containing(today);
            return Ok(movie_week_containing(this_week.end + Duration::days(1)));
        }
        _ => {}
    }

    if let Some((start, end)) = expr.split_once(" to ") {
        let start = parse_date(start, today)?;
        let end = parse_date(end, today)?;
        return DateRange::new(start, end);
    }

    Ok(DateRange::single(parse_date(&expr, today)?))
}

/// Parse a single date expression relative to `today`
pub fn parse_date(expr: &str, today: NaiveDate) -> Result<NaiveDate> {
    let expr = expr.trim().to_lowercase();

    match expr.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        _ => {}
    }

    if let Ok(weekday) = expr.parse::<Weekday>() {
        let ahead = (weekday.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
        return Ok(today + Duration::days(i64::from(ahead)));
    }

    NaiveDate::parse_from_str(&expr, "%Y-%m-%d")
        .map_err(|_| Error::InvalidInput(format!("unrecognized date: {:?}", expr)))
}

/// The Friday-Thursday movie week that contains `day`
pub fn movie_week_containing(day: NaiveDate) -> DateRange {
    let offset = (day.weekday().num_days_from_monday() + 7
        - MOVIE_WEEK_START.num_days_from_monday())
        % 7;
    let start = day - Duration::days(i64::from(offset));
    DateRange {
        start,
        end: start + Duration::days(6),
    }
}
