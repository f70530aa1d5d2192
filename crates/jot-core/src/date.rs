//! Date resolution
//!
//! Resolves the entry date from the raw text and a caller-supplied "today".
//! Exactly one rule fires, in priority order: relative keyword, explicit
//! `YYYY/M/D` or `YYYY-M-D`, short `M/D` (current year), today.

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

/// Keywords shifting "today" back two days, checked before the one-day set
/// because the English form contains "yesterday"
const DAY_BEFORE_YESTERDAY: &[&str] = &["day before yesterday", "前天", "前日"];

/// Keywords shifting "today" back one day
const YESTERDAY: &[&str] = &["yesterday", "昨天", "昨日"];

/// Resolve the entry date from `text`, defaulting to `today`
pub fn resolve_date(today: NaiveDate, text: &str) -> NaiveDate {
    let lowered = text.to_lowercase();

    if DAY_BEFORE_YESTERDAY.iter().any(|kw| lowered.contains(kw)) {
        return today - Duration::days(2);
    }
    if YESTERDAY.iter().any(|kw| lowered.contains(kw)) {
        return today - Duration::days(1);
    }

    let full = Regex::new(r"(\d{4})[/-](\d{1,2})[/-](\d{1,2})").expect("valid regex");
    if let Some(caps) = full.captures(text) {
        let parsed = parse_ymd(&caps[1], &caps[2], &caps[3]);
        // An impossible calendar date is an extraction miss, not an error
        return parsed.unwrap_or(today);
    }

    let short = Regex::new(r"\b(\d{1,2})/(\d{1,2})\b").expect("valid regex");
    if let Some(caps) = short.captures(text) {
        let parsed = caps[1]
            .parse::<u32>()
            .ok()
            .zip(caps[2].parse::<u32>().ok())
            .and_then(|(m, d)| NaiveDate::from_ymd_opt(today.year(), m, d));
        return parsed.unwrap_or(today);
    }

    today
}

fn parse_ymd(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    let year = y.parse::<i32>().ok()?;
    let month = m.parse::<u32>().ok()?;
    let day = d.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
