use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

/// Digits, spaces and `+ - ( )`, 7 to 15 characters.
pub static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s+\-()]{7,15}$").expect("phone pattern compiles"));

/// Calendar date as `YYYY-MM-DD`.
pub static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));

/// Time of day as `HH:MM`.
pub static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("time pattern compiles"));

/// Rejects values that are empty once surrounding whitespace is removed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Parses an id carried in a request body, reporting failures against `field`.
pub fn parse_uuid_field(field: &'static str, raw: &str) -> Result<Uuid, ValidationErrors> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.message = Some(format!("{} must be a valid id", field).into());
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        errors
    })
}
