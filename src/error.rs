use crate::services::{SignalError, ValidationErrors};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Value {
        match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Internal(msg) => {
                Value::String(msg.clone())
            }
            AppError::Validation(errors) => json!(errors.errors),
        }
    }
}

impl From<SignalError> for AppError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::NotFound(_) => AppError::NotFound("CSV file not found".to_string()),
            SignalError::EmptyInput => AppError::NotFound("CSV file is empty".to_string()),
            SignalError::MalformedInput(_) => {
                AppError::BadRequest("Invalid CSV file format".to_string())
            }
            SignalError::SchemaMismatch(missing) => {
                AppError::BadRequest(format!("Missing required columns: {}", missing.join(", ")))
            }
            SignalError::Computation(msg) => {
                AppError::Internal(format!("Error calculating strategy performance: {}", msg))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "detail": self.detail(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
