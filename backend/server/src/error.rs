use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{database::StoreError, schema::FieldErrors};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid form: {0}")]
    Validation(FieldErrors),

    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Misconfigured: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Store { .. } => StatusCode::BAD_GATEWAY,
            AppError::Config { .. } | AppError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            AppError::Validation(errors) => json!({ "errors": errors, "notices": [] }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::AppError;
    use crate::{database::StoreError, schema::FieldErrors};

    #[test]
    fn test_statuses() {
        let mut errors = FieldErrors::default();
        errors.insert("email", "Email không hợp lệ");

        let cases = [
            (AppError::Validation(errors), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
            (
                AppError::Store(StoreError::Unavailable("down".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::Config("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
