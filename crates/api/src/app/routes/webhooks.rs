use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub async fn register_webhook(
    Extension(services): Extension<Arc<AppServices>>,
    form: Result<Form<dto::RegisterWebhookForm>, FormRejection>,
) -> axum::response::Response {
    let body = match form {
        Ok(Form(body)) => body,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_form", e.body_text());
        }
    };

    let Some(webhook_url) = body.webhook_url.filter(|u| !u.trim().is_empty()) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_webhook_url",
            "webhook_url is required",
        );
    };

    match services.coordinator().register_webhook(&webhook_url) {
        // Delivery (if any) runs in the background; do not wait on it.
        Ok(_receipt) => (StatusCode::OK, Json(dto::MessageResponse::new("Webhook registered")))
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
