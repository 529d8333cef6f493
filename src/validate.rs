use regex::Regex;
use std::sync::LazyLock;

use crate::roster::StudentRecord;

pub const FIELDS: [&str; 5] = ["firstName", "lastName", "age", "email", "phone"];

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());
// 1-3 digits, leading digit nonzero.
static AGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{0,2}$").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.+/-]+@(gmail|yahoo)\.(com|org)$").unwrap());
// Egyptian mobile: country prefix, carrier code, 8 digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0020|\+20|0)(10|11|12|15)[0-9]{8}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    Invalid,
}

impl FieldError {
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::Required => "required",
            FieldError::Invalid => "invalid",
        }
    }

    /// The inline message shown next to the field.
    pub fn message(&self) -> &'static str {
        match self {
            FieldError::Required => "This field is required!",
            FieldError::Invalid => "Invalid input!",
        }
    }
}

fn rule(field: &str) -> Option<&'static Regex> {
    match field {
        "firstName" | "lastName" => Some(&NAME_RE),
        "age" => Some(&AGE_RE),
        "email" => Some(&EMAIL_RE),
        "phone" => Some(&PHONE_RE),
        _ => None,
    }
}

fn check(pattern: &Regex, value: &str) -> Result<(), FieldError> {
    // Emptiness wins over pattern mismatch.
    if value.is_empty() {
        return Err(FieldError::Required);
    }
    if !pattern.is_match(value) {
        return Err(FieldError::Invalid);
    }
    Ok(())
}

/// Validates one field value (trimmed first). Returns None for unknown field
/// names so callers can reject the request.
pub fn validate_field(field: &str, value: &str) -> Option<Result<(), FieldError>> {
    rule(field).map(|pattern| check(pattern, value.trim()))
}

/// Full-form validation. Every field is evaluated so the caller can surface
/// all errors at once; the record is assembled only when all five pass.
pub fn validate_record(
    values: &serde_json::Value,
) -> Result<StudentRecord, Vec<(&'static str, FieldError)>> {
    let mut errors = Vec::new();
    let mut trimmed: [String; 5] = Default::default();

    for (i, field) in FIELDS.iter().enumerate() {
        let value = values
            .get(field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim();
        let Some(pattern) = rule(field) else {
            continue;
        };
        match check(pattern, value) {
            Ok(()) => trimmed[i] = value.to_string(),
            Err(e) => errors.push((*field, e)),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let [first_name, last_name, age, email, phone] = trimmed;
    Ok(StudentRecord {
        first_name,
        last_name,
        age,
        email,
        phone,
    })
}
