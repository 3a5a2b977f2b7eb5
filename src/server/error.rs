//! HTTP error mapping

use crate::error::AppError;
use crate::models::ErrorResponse;
use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// An [`AppError`] paired with the HTTP status it is reported with
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: AppError,
}

impl ApiError {
    /// Create an error with an explicit status
    pub fn new(status: StatusCode, error: AppError) -> Self {
        Self { status, error }
    }

    /// HTTP status of the response
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Underlying application error
    pub fn error(&self) -> &AppError {
        &self.error
    }

    /// Text placed in the `error` field of the payload
    ///
    /// Client errors and the data-unavailable state are reported verbatim;
    /// anything else is reported generically.
    pub fn message(&self) -> String {
        match &self.error {
            AppError::Validation(msg) | AppError::DataUnavailable(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let status = match &error {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::new(rejection.status(), AppError::validation(rejection.body_text()))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            AppError::validation(format!("Invalid request body: {}", error)),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse { error: self.message() };
        (self.status, Json(body)).into_response()
    }
}
