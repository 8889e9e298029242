use axum::{
    routing::{get, post},
    Router,
};

pub mod status;
pub mod system;
pub mod webhooks;

/// Router for all endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/status", get(status::get_status))
        .route("/register_webhook", post(webhooks::register_webhook))
}
