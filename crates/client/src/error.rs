use engine::{FailureStatus, ServiceError};
use thiserror::Error;

/// Errors of the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    RequestFailed {
        status: FailureStatus,
        message: String,
    },
    #[error("Server unreachable: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> Option<FailureStatus> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestFailed {
                status: FailureStatus::Timeout,
                message: "Request timed out".to_string(),
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::RequestFailed { status, message } => Self::RequestFailed { status, message },
            ApiError::Network(message) | ApiError::Config(message) => Self::Network(message),
            ApiError::Decode(message) => Self::Decode(message),
        }
    }
}
