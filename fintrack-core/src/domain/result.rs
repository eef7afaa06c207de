//! Result and error types for the core library

use std::collections::HashMap;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// The first four variants are the outcomes of an authenticated request.
/// Their messages are meant to be shown to the user as-is.
#[derive(Error, Debug)]
pub enum Error {
    /// Refresh token missing, or the refresh call was rejected.
    /// Stored credentials have already been cleared.
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Refresh call succeeded but carried no new access token.
    #[error("Invalid refresh response")]
    InvalidRefreshResponse,

    /// The final call returned a non-success status
    #[error("{message}")]
    RequestFailed { message: String, status: StatusCode },

    /// Transport-level failure, passed through unchanged
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// HTTP status of the failing call, when there was one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the caller should send the user back to login
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Serializable outcome envelope (for `--json` output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            status,
            context: None,
        }
    }

    /// Attach context to the result
    pub fn with_context(mut self, context: HashMap<String, serde_json::Value>) -> Self {
        self.context = Some(context);
        self
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let status = e.status().map(|s| s.as_u16());
                Self::fail(e.to_string(), status)
            }
        }
    }
}
