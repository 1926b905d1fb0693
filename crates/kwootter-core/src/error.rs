//! Domain-level error types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation messages keyed by input field, in the order the rules fired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// First message recorded for `field`, if any.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Flatten into `field: message` lines.
    pub fn describe(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field}: {m}")))
            .collect()
    }
}

impl From<BTreeMap<String, Vec<String>>> for FieldErrors {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

impl From<FieldErrors> for BTreeMap<String, Vec<String>> {
    fn from(fields: FieldErrors) -> Self {
        fields.0
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Self::new();
        for (field, list) in errors.field_errors() {
            for error in list {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                fields.push(field.to_string(), message);
            }
        }
        fields
    }
}

/// Failure of one API operation, as seen by its caller.
///
/// Cloneable so a single in-flight result can be handed to every deduplicated waiter.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Validation failed: {}", .0.describe().join(", "))]
    Validation(FieldErrors),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// First validation message for `field`, when this is a validation failure.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match self {
            Self::Validation(fields) => fields.first(field),
            _ => None,
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound("Resource not found".to_string()),
            other => {
                tracing::error!(error = %other, "Repository failure");
                Self::Internal(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_field_error() {
        let mut fields = FieldErrors::new();
        fields.push("content", "too short");
        fields.push("content", "not an emoji");

        let err = ApiError::Validation(fields);
        assert_eq!(err.field_error("content"), Some("too short"));
        assert_eq!(err.field_error("username"), None);
    }

    #[test]
    fn test_field_error_only_for_validation() {
        assert_eq!(ApiError::TooManyRequests.field_error("content"), None);
    }
}
