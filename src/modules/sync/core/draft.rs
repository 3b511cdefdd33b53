// Drafts: the local, uncommitted copy of an entity's editable fields.
//
// Purpose
// - Hold raw form input (strings, checkboxes) apart from the typed entity.
// - Turn valid input into a backend row; report every invalid field at once otherwise.

use crate::shared::core::entity::Entity;
use crate::shared::core::row::Row;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[error("{}", summarize(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return "no validation errors".to_string();
    }
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Keeps the value of a passing check, records the error of a failing one.
    pub fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.errors.push(error);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub fn required(field: &str, value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FieldError::new(field, "is required"))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn non_negative_number(field: &str, value: &str) -> Result<f64, FieldError> {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() && number >= 0.0 => Ok(number),
        Ok(_) => Err(FieldError::new(field, "must be zero or more")),
        Err(_) => Err(FieldError::new(field, "must be a number")),
    }
}

pub fn non_negative_integer(field: &str, value: &str) -> Result<i64, FieldError> {
    match value.trim().parse::<i64>() {
        Ok(number) if number >= 0 => Ok(number),
        Ok(_) => Err(FieldError::new(field, "must be zero or more")),
        Err(_) => Err(FieldError::new(field, "must be a whole number")),
    }
}

/// Blank input is stored as null.
pub fn optional_text(value: &str) -> Value {
    match value.trim() {
        "" => Value::Null,
        text => Value::String(text.to_string()),
    }
}

/// "a, b,,c " -> ["a", "b", "c"]
pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

pub fn valid_email(field: &str, value: &str) -> Result<String, FieldError> {
    let email = required(field, value)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email.to_lowercase())
    } else {
        Err(FieldError::new(field, "must be a valid email address"))
    }
}

/// Editable form state for one entity type.
pub trait DraftForm: Clone + Send + Sync + 'static {
    type Entity: Entity;

    fn empty() -> Self;

    fn from_entity(entity: &Self::Entity) -> Self;

    /// Serialized fields, ready for insert or as the base of a patch.
    fn to_fields(&self) -> Result<Row, ValidationErrors>;

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.to_fields().map(|_| ())
    }
}
