use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::domain::tts::TtsServiceApi;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Storage check, 200 in both the healthy and the degraded state
pub async fn health_storage(State(tts_service): State<Arc<dyn TtsServiceApi>>) -> impl IntoResponse {
    if tts_service.storage_available().await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "storage": "connected"
            })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({
                "status": "degraded",
                "storage": "disconnected"
            })),
        )
    }
}
