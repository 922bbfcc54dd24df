//! Validation of raw user input: dates, amounts, month filters and free text.
//!
//! Every function here is total: bad input yields `None` and the caller
//! decides whether to re-prompt or fall back to a default.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{YearMonth, DATE_FORMAT};

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("valid date regex"))
}

fn month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{1,2}$").expect("valid month regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Parse a `dd/mm/yyyy` date.
pub fn validate_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if !date_re().is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Parse a non-negative amount. A comma is accepted as decimal separator.
pub fn validate_amount(raw: &str) -> Option<f64> {
    let s = raw.trim().replace(',', ".");
    let amount: f64 = s.parse().ok()?;
    if amount.is_finite() && amount >= 0.0 {
        Some(amount)
    } else {
        None
    }
}

/// Parse a `YYYY-MM` month filter.
pub fn validate_month(raw: &str) -> Option<YearMonth> {
    let raw = raw.trim();
    if !month_re().is_match(raw) {
        return None;
    }
    raw.parse().ok()
}

/// Make free text safe for a comma-delimited row: commas and line breaks
/// become spaces, runs of whitespace collapse, ends are trimmed.
pub fn sanitize_text(raw: &str) -> String {
    let replaced = raw.replace([',', '\n', '\r'], " ");
    whitespace_re().replace_all(replaced.trim(), " ").into_owned()
}
