// src/error.rs

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::models::common::{BaseResponse, ErrorCode};

/// Global Application Error Enum.
/// Every variant is rendered as the failure envelope `{code, data: null, message}`.
#[derive(Debug)]
pub enum AppError {
    // 40000 Invalid argument
    BadRequest(String),

    // 40100 Caller could not be identified
    NotLogin(String),

    // 40101 Caller is identified but not allowed
    Forbidden(String),

    // 40400 Referenced record does not exist
    NotFound(String),

    // 50000 Database or other unexpected failure
    InternalServerError(String),

    // 50001 A write on a valid request touched nothing
    OperationFailed(String),

    // 50002 Stored serialized payload cannot be decoded
    MalformedPayload(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::BadRequest(_) => ErrorCode::ParamsError,
            AppError::NotLogin(_) => ErrorCode::NotLoginError,
            AppError::Forbidden(_) => ErrorCode::NoAuthError,
            AppError::NotFound(_) => ErrorCode::NotFoundError,
            AppError::InternalServerError(_) => ErrorCode::SystemError,
            AppError::OperationFailed(_) => ErrorCode::OperationError,
            AppError::MalformedPayload(_) => ErrorCode::MalformedPayloadError,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into the failure envelope.
/// Server-side failures are logged and replaced by the generic message of their code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                code.message().to_string()
            }
            AppError::OperationFailed(msg) => {
                tracing::error!("Operation failed: {}", msg);
                code.message().to_string()
            }
            AppError::MalformedPayload(msg) => {
                tracing::error!("Malformed stored payload: {}", msg);
                code.message().to_string()
            }
            AppError::BadRequest(msg)
            | AppError::NotLogin(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg,
        };

        (StatusCode::OK, Json(BaseResponse::<()>::error(code, message))).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
