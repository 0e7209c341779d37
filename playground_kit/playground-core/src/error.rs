use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::response::NormalizedResponse;

/// Code attached to every failure that happened before any response arrived.
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
/// Code attached to requests that could not be built (e.g. an invalid header).
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Number(i64),
    Text(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Number(n) => write!(f, "{n}"),
            ErrorCode::Text(s) => f.write_str(s),
        }
    }
}

/// The uniform error shape handed to the UI.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct NormalizedError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl NormalizedError {
    pub fn network(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: if message.is_empty() { "Network error".to_string() } else { message },
            code: Some(ErrorCode::Text(NETWORK_ERROR.to_string())),
            class_name: None,
            data: None,
            errors: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(ErrorCode::Text(INVALID_REQUEST.to_string())),
            class_name: None,
            data: None,
            errors: None,
        }
    }

    /// Builds the error for a non-2xx response.
    ///
    /// Structured fields of the body win; otherwise the status text (or the
    /// numeric status when the reason phrase is unknown) is used.
    pub fn from_response(response: &NormalizedResponse) -> Self {
        let body = response.data.as_object();
        let field = |name: &str| body.and_then(|b| b.get(name)).filter(|v| !v.is_null());

        let message = field("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| Some(response.status_text.clone()).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| format!("HTTP {}", response.status));

        let code = field("code")
            .and_then(|code| match code {
                Value::Number(n) => n.as_i64().map(ErrorCode::Number),
                Value::String(s) if !s.is_empty() => Some(ErrorCode::Text(s.clone())),
                _ => None,
            })
            .unwrap_or(ErrorCode::Number(i64::from(response.status)));

        Self {
            message,
            code: Some(code),
            class_name: field("className").and_then(Value::as_str).map(str::to_string),
            data: field("data").cloned(),
            errors: field("errors").cloned(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(&self.code, Some(ErrorCode::Text(code)) if code == NETWORK_ERROR)
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(&self.code, Some(ErrorCode::Text(code)) if code == INVALID_REQUEST)
    }
}

/// Error returned by [`crate::client::Dispatcher`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A response arrived with a non-2xx status. The full response is kept
    /// so it can be displayed next to the error.
    #[error("{error}")]
    Http {
        response: Box<NormalizedResponse>,
        error: NormalizedError,
    },
    /// No response was received.
    #[error("{0}")]
    Network(NormalizedError),
    /// The request could not be built, so nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(NormalizedError),
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DispatchError {
    pub fn normalized(&self) -> NormalizedError {
        match self {
            DispatchError::Http { error, .. }
            | DispatchError::Network(error)
            | DispatchError::InvalidRequest(error) => error.clone(),
            DispatchError::Decode(err) => NormalizedError {
                message: err.to_string(),
                code: None,
                class_name: None,
                data: None,
                errors: None,
            },
        }
    }

    pub fn response(&self) -> Option<&NormalizedResponse> {
        match self {
            DispatchError::Http { response, .. } => Some(response.as_ref()),
            DispatchError::Network(_)
            | DispatchError::InvalidRequest(_)
            | DispatchError::Decode(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
