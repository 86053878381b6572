//! Date and number coercion for raw shelter fields.
//!
//! Every function here is total: malformed input yields `None` ("unknown"),
//! never an error, because gaps in operator-entered data are expected.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use shelter_stats_record_models::{CalendarValue, DateFormat, YearMonth};

/// Datetime layouts tried (in order) before falling back to date-only ones.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Date-only layouts.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a full calendar date.
///
/// Accepts `YYYY-MM-DD`, ISO 8601 datetimes with or without fractional
/// seconds (the time part is discarded), RFC 3339 timestamps (taken in UTC)
/// and `MM/DD/YYYY`.
#[must_use]
pub fn parse_full_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc().date())
}

/// Parses a strict `YYYY-MM` label.
#[must_use]
pub fn parse_year_month(s: &str) -> Option<YearMonth> {
    s.trim().parse().ok()
}

/// Normalizes a raw value in the expected `format`.
///
/// Non-string values (numbers, booleans, objects) are never dates and
/// normalize to `None`.
#[must_use]
pub fn normalize_date(raw: Option<&Value>, format: DateFormat) -> Option<CalendarValue> {
    let s = raw?.as_str()?;
    match format {
        DateFormat::FullDate => parse_full_date(s).map(CalendarValue::Date),
        DateFormat::YearMonth => parse_year_month(s).map(CalendarValue::YearMonth),
    }
}

/// Parses an age in months from a JSON number or numeric string.
///
/// Negative and non-finite values are treated as unknown.
#[must_use]
pub fn parse_age_months(raw: Option<&Value>) -> Option<f64> {
    let age = match raw? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (age.is_finite() && age >= 0.0).then_some(age)
}

/// Reads a label from a JSON string or number, trimmed. Blank is `None`.
#[must_use]
pub fn parse_label(raw: Option<&Value>) -> Option<String> {
    let label = match raw? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!label.is_empty()).then_some(label)
}
