use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document store error {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Failed to save {entity}: {reason}")]
    WriteFailed { entity: &'static str, reason: String },

    #[error("Failed to load data: {0}")]
    ReadFailed(String),

    #[error("Connection test failed: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    /// Wraps a persistence error raised while writing `entity`.
    pub fn write(entity: &'static str, err: AppError) -> Self {
        match err {
            AppError::WriteFailed { .. } => err,
            other => AppError::WriteFailed {
                entity,
                reason: other.to_string(),
            },
        }
    }

    pub fn read(err: AppError) -> Self {
        match err {
            AppError::ReadFailed(_) => err,
            other => AppError::ReadFailed(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Serialization(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::WriteFailed { entity, reason } => {
                error!("failed to save {}: {}", entity, reason);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Failed to save {}. Please try again.", entity),
                )
            }
            AppError::ReadFailed(reason) => {
                error!("failed to load data: {}", reason);
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to load data from database.".to_string(),
                )
            }
            AppError::Unavailable(reason) => {
                error!("connection test failed: {}", reason);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database connection failed. Please check your configuration.".to_string(),
                )
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Http(e) => {
                error!("http error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Document store request failed".to_string(),
                )
            }
            AppError::Remote { status, body } => {
                error!("document store returned {}: {}", status, body);
                (
                    StatusCode::BAD_GATEWAY,
                    "Document store request failed".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
