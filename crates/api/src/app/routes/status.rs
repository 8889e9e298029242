use std::sync::Arc;

use axum::{extract::Extension, Json};

use crate::app::dto::StatusResponse;
use crate::app::services::AppServices;

pub async fn get_status(Extension(services): Extension<Arc<AppServices>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: services.status(),
    })
}
