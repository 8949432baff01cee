//! Parsing helpers shared by the request forms.
//!
//! Form fields arrive as loosely-typed JSON: numbers may be sent as strings
//! and identifiers such as phone numbers may be sent as numbers. Every value
//! is normalized (trimmed) before it is checked.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::error::AppError;

/// A scalar form value that may be sent as text or as a JSON number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    /// Trimmed textual form of the value
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::Number(n) => n.to_string(),
        }
    }

    /// Numeric form of the value, parsing text when needed
    pub fn to_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
        .filter(|n: &f64| n.is_finite())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// Require a non-empty value, returning its trimmed text
pub fn required_text(value: Option<&FieldValue>, label: &str) -> Result<String, AppError> {
    value
        .map(FieldValue::to_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required!", label)))
}

/// Require a numeric value at or above `min`
pub fn required_measure(
    value: Option<&FieldValue>,
    label: &str,
    min: f64,
    unit: &str,
) -> Result<f64, AppError> {
    let raw = value.filter(|v| !v.to_text().is_empty()).ok_or_else(|| {
        AppError::Validation(format!("{} is required!", label))
    })?;

    let number = raw
        .to_number()
        .ok_or_else(|| AppError::Validation(format!("{} must be a number!", label)))?;

    if number < min {
        return Err(AppError::Validation(format!(
            "{} must be at least {} {}!",
            label, min, unit
        )));
    }

    Ok(number)
}

/// Basic `local@domain.tld` shape check: no whitespace, an `@` preceded by at
/// least one character, and a `.` with characters on both sides after it
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    email.match_indices('@').any(|(at, _)| {
        if at == 0 {
            return false;
        }
        let domain = &email[at + 1..];
        domain
            .match_indices('.')
            .any(|(dot, _)| dot > 0 && dot + 1 < domain.len())
    })
}

/// Parse a calendar date given as `YYYY-MM-DD` or as an RFC 3339 timestamp
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}
