//! Shared parameter validation
//!
//! Every tool validates its parameters before touching the network; a
//! validation failure produces a result with a `null` status code and no
//! HTTP call. Amounts arrive from the host as JSON numbers or numeric
//! strings and both forms are accepted everywhere.

use chrono::{Duration, NaiveDate, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Keys whose values are absent, null or the empty string
///
/// Presence means a non-empty value; numbers and booleans always count as
/// present, so a zero amount reaches the range check instead of the
/// missing-parameter message.
pub fn missing_required(params: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter(|key| match params.get(**key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .map(|key| (*key).to_string())
        .collect()
}

/// Validation failure carrying the user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

type VResult<T> = Result<T, ValidationError>;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap_or_else(|_| unreachable!()))
}

fn alphanumeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap_or_else(|_| unreachable!()))
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\d+\-()\s]+$").unwrap_or_else(|_| unreachable!()))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").unwrap_or_else(|_| unreachable!()))
}

/// Extract a required string parameter; the empty string counts as missing
pub fn required_str<'a>(params: &'a Value, key: &str, message: &str) -> VResult<&'a str> {
    match params.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::new(message)),
    }
}

/// Extract an optional string parameter; the empty string yields `None`
pub fn optional_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Parse an amount from a JSON number or numeric string
///
/// Returns `None` when the parameter is absent or empty; an unparseable
/// value is a validation error.
pub fn parse_amount(params: &Value, key: &str, label: &str) -> VResult<Option<f64>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ValidationError::new(format!("{} must be a valid number", label)))
        }
        Some(_) => Err(ValidationError::new(format!(
            "{} must be a valid number",
            label
        ))),
    }
}

/// Parse a required amount that must be at least `min`
pub fn required_amount_min(params: &Value, key: &str, label: &str, min: f64) -> VResult<f64> {
    match parse_amount(params, key, label)? {
        Some(amount) if amount >= min => Ok(amount),
        Some(_) => Err(ValidationError::new(format!(
            "{} must be at least {}",
            label, min
        ))),
        None => Err(ValidationError::new(format!("{} is required", label))),
    }
}

/// Parse a required amount that must be strictly greater than zero
pub fn required_amount_positive(params: &Value, key: &str, label: &str) -> VResult<f64> {
    match parse_amount(params, key, label)? {
        Some(amount) if amount > 0.0 => Ok(amount),
        Some(_) => Err(ValidationError::new(format!(
            "{} must be greater than 0",
            label
        ))),
        None => Err(ValidationError::new(format!("{} is required", label))),
    }
}

/// Check a string's character length against an inclusive range
pub fn check_length(value: &str, label: &str, min: usize, max: usize) -> VResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::new(format!(
            "{} must be between {} and {} characters",
            label, min, max
        )));
    }
    Ok(())
}

/// Check a string's character length against a maximum only
pub fn check_max_length(value: &str, label: &str, max: usize) -> VResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::new(format!(
            "{} must not exceed {} characters",
            label, max
        )));
    }
    Ok(())
}

/// Identifiers: letters, digits, underscore and hyphen only
pub fn check_identifier_charset(value: &str, label: &str) -> VResult<()> {
    if !identifier_pattern().is_match(value) {
        return Err(ValidationError::new(format!(
            "{} can only contain alphanumeric characters, '_' and '-'",
            label
        )));
    }
    Ok(())
}

/// Strictly alphanumeric: letters and digits only, no separators
pub fn check_alphanumeric(value: &str, label: &str) -> VResult<()> {
    if !alphanumeric_pattern().is_match(value) {
        return Err(ValidationError::new(format!(
            "{} must contain only alphanumeric characters",
            label
        )));
    }
    Ok(())
}

/// Phone numbers: digits plus `+ - ( )` and spaces
pub fn check_phone(value: &str, label: &str) -> VResult<()> {
    if !phone_pattern().is_match(value) {
        return Err(ValidationError::new(format!(
            "{} contains invalid characters",
            label
        )));
    }
    Ok(())
}

/// Lightweight email shape check: one `@`, a dot in the domain
pub fn check_email(value: &str) -> VResult<()> {
    if !email_pattern().is_match(value) {
        return Err(ValidationError::new("Invalid email format"));
    }
    Ok(())
}

/// URLs must fit Cashfree's 250-character ceiling
pub fn check_url_length(value: &str, label: &str) -> VResult<()> {
    if value.chars().count() > 250 {
        return Err(ValidationError::new(format!(
            "{} must not exceed 250 characters",
            label
        )));
    }
    Ok(())
}

/// Webhook URLs must use the HTTPS scheme
pub fn check_https_url(value: &str, label: &str) -> VResult<()> {
    if !value.starts_with("https://") {
        return Err(ValidationError::new(format!(
            "{} must use HTTPS protocol",
            label
        )));
    }
    Ok(())
}

/// Check membership in a fixed set of allowed values
pub fn check_one_of(value: &str, label: &str, allowed: &[&str]) -> VResult<()> {
    if !allowed.contains(&value) {
        let rendered: Vec<String> = allowed.iter().map(|a| format!("'{}'", a)).collect();
        return Err(ValidationError::new(format!(
            "{} must be either {}",
            label,
            rendered.join(" or ")
        )));
    }
    Ok(())
}

/// Validate a `YYYY/MM/DD` expiry date: strictly future, at most 30 days out
///
/// Comparison is date-only against today in UTC: today itself is rejected,
/// tomorrow through today+30 are accepted, today+31 is rejected.
pub fn check_expiry_window(value: &str, label: &str) -> VResult<NaiveDate> {
    let expiry = NaiveDate::parse_from_str(value, "%Y/%m/%d").map_err(|_| {
        ValidationError::new(format!("{} must be in YYYY/MM/DD format", label))
    })?;
    let today = Utc::now().date_naive();
    if expiry <= today {
        return Err(ValidationError::new(format!(
            "{} must be a future date",
            label
        )));
    }
    if expiry > today + Duration::days(30) {
        return Err(ValidationError::new(format!(
            "{} cannot be more than 30 days from today",
            label
        )));
    }
    Ok(expiry)
}
