//! Shared API error type and request helpers.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// API error type mapping to HTTP status codes.
///
/// Every variant renders as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Unwraps a JSON body, turning a malformed or absent body into the same
/// 400 a missing field would produce.
pub(crate) fn json_body<T>(
    body: Result<Json<T>, JsonRejection>,
    missing: &str,
) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("rejected request body: {}", rejection.body_text());
            Err(ApiError::BadRequest(missing.to_string()))
        }
    }
}

/// A required string field: `None` when absent or blank.
pub(crate) fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}
