use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

/// Errors raised while assembling the playground.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config Error: {0}")]
    Config(String),
    #[error("Invalid service path `{0}`: {1}")]
    InvalidPath(String, &'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors a service operation reports to its caller.
///
/// Rendered as a JSON body `{name, message, code, className, data?, errors?}`
/// with the matching HTTP status.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{message}")]
    BadRequest { message: String, data: Option<Value> },
    #[error("{message}")]
    NotFound { message: String, data: Option<Value> },
    #[error("{0}")]
    MethodNotAllowed(String),
    #[error("{message}")]
    Unprocessable { message: String, errors: Value },
    #[error("{0}")]
    General(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest {
            message: message.into(),
            data: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound {
            message: message.into(),
            data: None,
        }
    }

    /// Attaches extra context to `BadRequest`/`NotFound`; other kinds are unchanged.
    pub fn with_data(mut self, value: Value) -> Self {
        match &mut self {
            ServiceError::BadRequest { data, .. } | ServiceError::NotFound { data, .. } => {
                *data = Some(value);
            }
            ServiceError::MethodNotAllowed(_)
            | ServiceError::Unprocessable { .. }
            | ServiceError::General(_) => {}
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::General(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServiceError::BadRequest { .. } => "BadRequest",
            ServiceError::NotFound { .. } => "NotFound",
            ServiceError::MethodNotAllowed(_) => "MethodNotAllowed",
            ServiceError::Unprocessable { .. } => "Unprocessable",
            ServiceError::General(_) => "GeneralError",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ServiceError::BadRequest { .. } => "bad-request",
            ServiceError::NotFound { .. } => "not-found",
            ServiceError::MethodNotAllowed(_) => "method-not-allowed",
            ServiceError::Unprocessable { .. } => "unprocessable",
            ServiceError::General(_) => "general-error",
        }
    }

    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "name": self.name(),
            "message": self.to_string(),
            "code": self.status().as_u16(),
            "className": self.class_name(),
        });
        match self {
            ServiceError::BadRequest { data: Some(data), .. }
            | ServiceError::NotFound { data: Some(data), .. } => {
                body["data"] = data.clone();
            }
            ServiceError::Unprocessable { errors, .. } => {
                body["errors"] = errors.clone();
            }
            _ => {}
        }
        body
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::bad_request(format!("Invalid data: {err}"))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_body())).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        ServiceError::General(self.to_string()).into_response()
    }
}
