//! JSON error bodies: `{"error": code, "message": text}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use vtrans_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> Response {
    let (status, code) = match &err {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::InvariantViolation(_) => (StatusCode::CONFLICT, "invariant_violation"),
    };
    json_error(status, code, err.to_string())
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    let body = json!({
        "error": code,
        "message": message.into(),
    });
    (status, axum::Json(body)).into_response()
}
