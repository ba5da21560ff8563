use crate::config::ConfigError;
use crate::store::RepositoryError;
use crate::telemetry::TelemetryError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Failure classes shared by every workflow boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input.
    Validation,
    /// Missing, invalid, or expired credential.
    Auth,
    /// Authenticated, but outside the caller's scope.
    Forbidden,
    /// Unresolved scheme, application, request, or profile id.
    NotFound,
    /// Duplicate application or already-processed edit request.
    Conflict,
    /// Underlying persistence failure.
    Store,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Auth => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Render a workflow error as the service's `{"error": ...}` payload. Store
/// failures are logged here so no handler can drop them silently.
pub fn error_response(kind: ErrorKind, message: String) -> Response {
    if kind == ErrorKind::Store {
        tracing::error!(error = %message, "store failure surfaced to caller");
    }
    let body = Json(json!({ "error": message }));
    (kind.status_code(), body).into_response()
}

/// Malformed or mistyped request body, reported as a validation failure.
pub fn rejection_response(rejection: JsonRejection) -> Response {
    error_response(ErrorKind::Validation, rejection.body_text())
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(RepositoryError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Store(value)
    }
}
