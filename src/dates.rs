//! Best-effort publication date extraction.
//!
//! Metadata values are tried against strict machine formats first; anything
//! else (and free body text) goes through an ordered table of textual date
//! patterns, where the earliest match in the text wins. Failure is always
//! `None`, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::{Captures, Regex};
use std::sync::LazyLock;

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

type DateBuilder = fn(&Captures) -> Option<NaiveDate>;

static TEXT_RULES: LazyLock<Vec<(Regex, DateBuilder)>> = LazyLock::new(|| {
    let rules: [(String, DateBuilder); 5] = [
        (
            r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b".to_string(),
            iso_date as DateBuilder,
        ),
        (
            format!(r"(?i)\b{MONTH}\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b"),
            month_day_year as DateBuilder,
        ),
        (
            format!(r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+{MONTH}\.?,?\s+(\d{{4}})\b"),
            day_month_year as DateBuilder,
        ),
        (
            r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b".to_string(),
            us_numeric as DateBuilder,
        ),
        (
            format!(r"(?i)\b{MONTH}\.?,?\s+(\d{{4}})\b"),
            month_year as DateBuilder,
        ),
    ];

    rules
        .into_iter()
        .filter_map(|(pattern, build)| match Regex::new(&pattern) {
            Ok(re) => Some((re, build)),
            Err(e) => {
                ::log::error!("Invalid date pattern {}: {}", pattern, e);
                None
            }
        })
        .collect()
});

/// 2024-10-01
fn iso_date(c: &Captures) -> Option<NaiveDate> {
    ymd(num(c, 1)?, num(c, 2)?, num(c, 3)?)
}

/// October 1, 2024 / Oct. 1st 2024
fn month_day_year(c: &Captures) -> Option<NaiveDate> {
    ymd(num(c, 3)?, month_number(c.get(1)?.as_str())?, num(c, 2)?)
}

/// 1 October 2024
fn day_month_year(c: &Captures) -> Option<NaiveDate> {
    ymd(num(c, 3)?, month_number(c.get(2)?.as_str())?, num(c, 1)?)
}

/// 10/01/2024, month first
fn us_numeric(c: &Captures) -> Option<NaiveDate> {
    ymd(num(c, 3)?, num(c, 1)?, num(c, 2)?)
}

/// October 2024, pinned to the first of the month
fn month_year(c: &Captures) -> Option<NaiveDate> {
    ymd(num(c, 2)?, month_number(c.get(1)?.as_str())?, 1)
}

fn num(c: &Captures, idx: usize) -> Option<u32> {
    c.get(idx)?.as_str().parse().ok()
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1900..=2100).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a single date value such as a `<meta content>` or `datetime` attribute.
///
/// Falls back to searching the value as free text.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    find_date_in_text(value)
}

/// Parse an HTTP `Last-Modified` header value (RFC 7231 IMF-fixdate)
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Find the first recognizable date mentioned in free text
pub fn find_date_in_text(text: &str) -> Option<DateTime<Utc>> {
    TEXT_RULES
        .iter()
        .filter_map(|(re, build)| {
            re.captures_iter(text)
                .find_map(|c| build(&c).map(|date| (c.get(0).map_or(0, |m| m.start()), date)))
        })
        .min_by_key(|(start, _)| *start)
        .and_then(|(_, date)| midnight_utc(date))
}
