//! Day boundaries and date input handling
//!
//! Due dates are stored as the last millisecond of the chosen calendar day,
//! so a quest due "today" stays on time until local midnight.
//!
//! Supported input formats for due dates:
//! - ISO dates: "2026-01-25"
//! - Human dates: "Jan 25", "January 25 2026"
//! - Relative: "today", "tomorrow", "monday", "next friday"
//! - Offset: "in 3 days", "in 1 week"

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Weekday};

use crate::error::{CoreError, Result};

/// Resolve a naive local wall-clock time, picking the earlier instant on DST overlaps
fn localize(naive: NaiveDateTime) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

/// Local midnight starting the given calendar day
pub fn day_start(date: NaiveDate) -> DateTime<Local> {
    localize(date.and_time(NaiveTime::MIN))
}

/// Local midnight starting the day `now` falls in
pub fn start_of_day(now: DateTime<Local>) -> DateTime<Local> {
    day_start(now.date_naive())
}

/// Local midnight starting the day after `now`
pub fn start_of_tomorrow(now: DateTime<Local>) -> DateTime<Local> {
    let today = now.date_naive();
    match today.succ_opt() {
        Some(tomorrow) => day_start(tomorrow),
        None => start_of_day(now) + TimeDelta::days(1),
    }
}

/// Last millisecond of the given calendar day (23:59:59.999 local)
pub fn end_of_day(date: NaiveDate) -> DateTime<Local> {
    let naive = date.and_time(NaiveTime::MIN) + TimeDelta::days(1) - TimeDelta::milliseconds(1);
    localize(naive)
}

/// Format a due timestamp the way date inputs expect it ("YYYY-MM-DD", empty for none)
pub fn format_date_input(ts: Option<DateTime<Local>>) -> String {
    ts.map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Parse a due-date input into an end-of-day timestamp
///
/// An empty input or "none" clears the due date.
pub fn parse_due(input: &str) -> Result<Option<DateTime<Local>>> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_date(trimmed).map(|date| Some(end_of_day(date)))
}

/// Parse a date string relative to the current local day
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    parse_date_from(input, Local::now().date_naive())
}

/// Parse a date string relative to `today`
///
/// Supports multiple formats:
/// - ISO: "2026-01-25"
/// - Human: "Jan 25", "January 25", "Jan 25 2026"
/// - Relative: "today", "tomorrow", "yesterday"
/// - Weekdays: "monday", "tuesday", etc. (next occurrence)
/// - Prefixed: "next monday", "next friday"
/// - Offset: "in 3 days", "in 1 week", "in 2 weeks"
pub fn parse_date_from(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim().to_lowercase();

    if let Some(date) = try_parse_relative(&input, today) {
        return Ok(date);
    }

    if let Some(date) = try_parse_weekday(&input, today) {
        return Ok(date);
    }

    if let Some(date) = try_parse_offset(&input, today) {
        return Ok(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
        return Ok(date);
    }

    let with_year = [
        "%b %d %Y", // jan 25 2026
        "%B %d %Y", // january 25 2026
        "%m/%d/%Y", // 01/25/2026
        "%d %b %Y", // 25 jan 2026
        "%d %B %Y", // 25 january 2026
    ];
    for format in &with_year {
        if let Ok(date) = NaiveDate::parse_from_str(&input, format) {
            return Ok(date);
        }
    }

    // Without a year: this year, or next year once the day has passed
    let without_year = ["%b %d", "%B %d", "%m/%d", "%d %b", "%d %B"];
    for format in &without_year {
        let candidate = format!("{} {}", input, today.year());
        let format_with_year = format!("{} %Y", format);
        if let Ok(date) = NaiveDate::parse_from_str(&candidate, &format_with_year) {
            if date < today {
                return date
                    .with_year(today.year() + 1)
                    .ok_or_else(|| CoreError::parse("Invalid date"));
            }
            return Ok(date);
        }
    }

    Err(CoreError::parse(format!(
        "Could not parse date '{}'. Try formats like: 'tomorrow', 'Jan 25', '2026-01-25', 'next monday', 'in 3 days'",
        input
    )))
}

fn try_parse_relative(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    match input {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        _ => None,
    }
}

fn try_parse_weekday(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let weekday_str = input.strip_prefix("next ").unwrap_or(input).trim();

    let target = match weekday_str {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };

    // Always strictly in the future: a weekday equal to today means next week
    let days = (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    let days = if days == 0 { 7 } else { days };
    today.checked_add_days(Days::new(u64::from(days)))
}

fn try_parse_offset(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let rest = input.strip_prefix("in ")?.trim();
    let parts: Vec<&str> = rest.split_whitespace().collect();

    if parts.len() != 2 {
        return None;
    }

    let num: u64 = parts[0].parse().ok()?;

    match parts[1] {
        "day" | "days" => today.checked_add_days(Days::new(num)),
        "week" | "weeks" => today.checked_add_days(Days::new(num.checked_mul(7)?)),
        _ => None,
    }
}

/// Format a NaiveDate for human-readable display
///
/// Returns strings like: "Today", "Tomorrow", "Mon Jan 27", "Overdue (3 days ago)"
pub fn format_date_human(date: NaiveDate, relative_to_today: bool) -> String {
    if !relative_to_today {
        return date.format("%Y-%m-%d").to_string();
    }

    let today = Local::now().date_naive();
    let diff = date.signed_duration_since(today).num_days();

    match diff {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        2..=6 => date.format("%a %b %d").to_string(),
        7..=365 => date.format("%b %d").to_string(),
        _ if diff < 0 => format!("Overdue ({} days ago)", -diff),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

/// Percentage of `value` out of `max`, clamped to `[0, 100]`
pub fn progress_percent(value: u64, max: u64) -> f64 {
    if max == 0 {
        return 0.0;
    }
    (value as f64 / max as f64 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_start_of_day() {
        let now = Local.with_ymd_and_hms(2026, 3, 10, 15, 42, 7).single().unwrap();
        let start = start_of_day(now);

        assert_eq!(start.date_naive(), date(2026, 3, 10));
        assert_eq!((start.hour(), start.minute(), start.second()), (0, 0, 0));
        assert_eq!(start_of_tomorrow(now).date_naive(), date(2026, 3, 11));
    }

    #[test]
    fn test_end_of_day() {
        let end = end_of_day(date(2026, 3, 10));

        assert_eq!(end.date_naive(), date(2026, 3, 10));
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert_eq!(end.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn test_parse_due() {
        assert!(parse_due("").unwrap().is_none());
        assert!(parse_due("None").unwrap().is_none());

        let due = parse_due("2026-01-25").unwrap().unwrap();
        assert_eq!(due, end_of_day(date(2026, 1, 25)));
        assert_eq!(format_date_input(Some(due)), "2026-01-25");
        assert_eq!(format_date_input(None), "");

        assert!(parse_due("not a date").is_err());
    }

    #[test]
    fn test_parse_today_tomorrow() {
        let today = date(2026, 3, 10);
        assert_eq!(parse_date_from("today", today).unwrap(), today);
        assert_eq!(parse_date_from("Tomorrow", today).unwrap(), date(2026, 3, 11));
    }

    #[test]
    fn test_parse_weekday() {
        // 2026-03-10 is a Tuesday
        let today = date(2026, 3, 10);
        assert_eq!(parse_date_from("friday", today).unwrap(), date(2026, 3, 13));
        assert_eq!(parse_date_from("next tue", today).unwrap(), date(2026, 3, 17));
    }

    #[test]
    fn test_parse_offset() {
        let today = date(2026, 3, 10);
        assert_eq!(parse_date_from("in 3 days", today).unwrap(), date(2026, 3, 13));
        assert_eq!(parse_date_from("in 2 weeks", today).unwrap(), date(2026, 3, 24));
    }

    #[test]
    fn test_parse_without_year_rolls_forward() {
        let today = date(2026, 3, 10);
        assert_eq!(parse_date_from("Jan 25", today).unwrap(), date(2027, 1, 25));
        assert_eq!(parse_date_from("Apr 2", today).unwrap(), date(2026, 4, 2));
    }

    #[test]
    fn test_format_date_human() {
        let today = Local::now().date_naive();
        assert_eq!(format_date_human(today, true), "Today");
        assert_eq!(format_date_human(today + TimeDelta::days(1), true), "Tomorrow");
        assert_eq!(format_date_human(date(2026, 1, 25), false), "2026-01-25");
    }

    #[test]
    fn test_progress_percent_clamps() {
        assert_eq!(progress_percent(50, 100), 50.0);
        assert_eq!(progress_percent(150, 100), 100.0);
        assert_eq!(progress_percent(3, 0), 0.0);
    }
}
