//! The module contains the errors the engine can surface.
//!
//! - [`ServiceError`] is what a remote resource service reports back.
//! - [`ValidationErrors`] collects client-side field errors of a form.
//! - [`EngineError`] wraps both for callers that want a single type.
use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Why a request did not produce a usable response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureStatus {
    /// The server answered with a status >= 400.
    Http(u16),
    /// No answer within the configured request timeout.
    Timeout,
}

impl FailureStatus {
    pub fn is_unauthorized(self) -> bool {
        matches!(self, Self::Http(401))
    }
}

impl fmt::Display for FailureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "HTTP {code}"),
            Self::Timeout => f.write_str("timeout"),
        }
    }
}

/// Failure of a remote resource call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{message}")]
    RequestFailed {
        status: FailureStatus,
        message: String,
    },
    #[error("Server unreachable: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn status(&self) -> Option<FailureStatus> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Field errors found before a form is sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        // First error per field wins.
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// `Ok(value)` when nothing was collected, the errors otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Engine custom errors.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Invalid form: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Form is not open for editing")]
    NotOpen,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failed_displays_server_message() {
        let err = ServiceError::RequestFailed {
            status: FailureStatus::Http(422),
            message: "The amount field is required.".to_string(),
        };
        assert_eq!(err.to_string(), "The amount field is required.");
        assert_eq!(err.status(), Some(FailureStatus::Http(422)));
    }

    #[test]
    fn validation_errors_keep_first_message_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("amount", "required");
        errors.add("amount", "must be positive");
        errors.add("loan_id", "required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("amount"), Some("required"));
        assert_eq!(errors.to_string(), "amount: required; loan_id: required");
    }
}
