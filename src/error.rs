use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::db::StoreError;

/// Machine-readable error code sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
}

/// Wire shape of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<String>,
    },

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationFailed,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(_) => AppError::Conflict("Resource already exists"),
            StoreError::EmptyPatch => AppError::validation("No updates provided"),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            message: "Invalid request body".into(),
            details: Some(rejection.body_text()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation { message, details } => ErrorResponse {
                code: ErrorCode::ValidationFailed,
                message,
                details,
            },
            AppError::Internal(e) => {
                // Raw store/driver text stays in the logs.
                error!(error = ?e, "internal error");
                ErrorResponse {
                    code: ErrorCode::Internal,
                    message: "Something went wrong".into(),
                    details: None,
                }
            }
            other => ErrorResponse {
                code: other.code(),
                message: other.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
