//! Error handling for the Contract Farming Marketplace backend
//!
//! Remote store failures are classified into connection, authorization,
//! query and data-shape errors and surface to callers unchanged.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ShapeError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Remote store errors
    #[error("Remote store unreachable: {0}")]
    Connection(String),

    #[error("Remote store denied access: {0}")]
    Authorization(String),

    #[error("Remote store rejected query: {0}")]
    Query(String),

    #[error("Remote payload does not match the read model: {0}")]
    DataShape(#[from] ShapeError),

    #[error("Remote store did not respond within {0:?}")]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,

    // Authentication errors
    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    InvalidInput(#[from] validator::ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Connection(_) => "CONNECTION_ERROR",
            AppError::Authorization(_) => "AUTHORIZATION_ERROR",
            AppError::Query(_) => "QUERY_ERROR",
            AppError::DataShape(_) => "DATA_SHAPE_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Cancelled => "CANCELLED",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Validation { .. } | AppError::InvalidInput(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Connection(_) | AppError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Authorization(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Query(_) | AppError::DataShape(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::InvalidToken | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation { .. } | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => AppError::Connection(err.to_string()),
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
                match code.as_str() {
                    "42501" | "28000" | "28P01" => {
                        AppError::Authorization(db.message().to_string())
                    }
                    "23505" => AppError::Conflict(db.message().to_string()),
                    "23503" => AppError::NotFound("Referenced record".to_string()),
                    c if c.starts_with("08") => AppError::Connection(db.message().to_string()),
                    c if c.starts_with("42") => AppError::Query(db.message().to_string()),
                    _ => AppError::Internal(err.to_string()),
                }
            }
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::TypeNotFound { .. } => {
                AppError::DataShape(ShapeError::Decode(err.to_string()))
            }
            sqlx::Error::RowNotFound => AppError::NotFound("Record".to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let field = match &self {
            AppError::Validation { field, .. } => Some(field.clone()),
            AppError::InvalidInput(errors) => errors
                .field_errors()
                .keys()
                .next()
                .map(|f| f.to_string()),
            _ => None,
        };

        let message = match &self {
            // Upstream detail stays in the log
            AppError::Connection(_) => "The data store is temporarily unavailable".to_string(),
            AppError::Internal(_) | AppError::Configuration(_) => {
                "An internal server error occurred".to_string()
            }
            other => other.to_string(),
        };

        tracing::error!("Error: {:?}", self);

        let status = self.status();
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_errors_map_to_gateway_statuses() {
        assert_eq!(
            AppError::Connection("refused".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Query("PGRST200".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::DataShape(ShapeError::Decode("x".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Timeout(Duration::from_secs(1)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_pool_timeout_is_connection_error() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Connection(_)));
    }

    #[test]
    fn test_row_not_found_is_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
