//! Required-field validation for the record operations
//!
//! A [`ValidationError`] is the only error the core raises. Everything else
//! (unknown filters, out-of-range pages) degrades to empty results.

use serde_json::Value;
use thiserror::Error;

use crate::types::ConsentFlags;

/// A record operation was rejected because a required field was missing or malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Consent data is required")]
    MissingConsent,

    #[error("Consent data is malformed: {0}")]
    MalformedConsent(String),

    #[error("Event type is required")]
    MissingEventType,

    #[error("Event type and action are required")]
    MissingTypeOrAction,
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingConsent | ValidationError::MalformedConsent(_) => "consent",
            ValidationError::MissingEventType => "type",
            ValidationError::MissingTypeOrAction => "type/action",
        }
    }
}

/// Check the raw consent record and decode its flags.
///
/// `null` and an absent field both count as missing. Anything that is not an
/// object of booleans is malformed.
pub fn parse_consent(raw: Option<&Value>) -> Result<ConsentFlags, ValidationError> {
    match raw {
        None | Some(Value::Null) => Err(ValidationError::MissingConsent),
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::MalformedConsent(e.to_string())),
        Some(other) => Err(ValidationError::MalformedConsent(format!(
            "expected an object of boolean flags, got {}",
            json_kind(other)
        ))),
    }
}

/// Returns the trimmed-non-empty value, or `None`
pub fn required_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
