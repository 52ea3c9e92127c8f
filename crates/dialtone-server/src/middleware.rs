use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::AppState;

/// Header carrying the shared secret on protected routes.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Middleware that rejects requests whose `X-API-Key` header does not match
/// the configured shared secret.
///
/// The check runs before the handler, so a rejected request never has its
/// body parsed, never reaches the voice provider and never starts a call.
///
/// This is a fixed comparison value, not a credential system: there is no
/// issuance, rotation or per-client identity.
pub async fn api_key_middleware(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?
        .clone();

    let header = req.headers().get(API_KEY_HEADER);
    let header_present = header.is_some();
    let authorized = header
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| !key.is_empty() && key == state.api_key);

    if !authorized {
        tracing::warn!(
            path = %req.uri().path(),
            header_present,
            "rejected request with missing or invalid API key"
        );
        return Ok(unauthorized());
    }

    Ok(next.run(req).await)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "Unauthorized" })),
    )
        .into_response()
}
