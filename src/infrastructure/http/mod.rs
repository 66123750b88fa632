use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{health, tts::TtsController};
use crate::domain::tts::TtsServiceApi;
use crate::infrastructure::config::Config;
use crate::infrastructure::middleware::request_id_middleware;

/// Build the application router with every route and layer attached
pub fn build_router(tts_service: Arc<dyn TtsServiceApi>) -> Router {
    let tts_controller = Arc::new(TtsController::new(tts_service.clone()));

    let tts_routes = Router::new()
        .route("/api/generate", post(TtsController::generate))
        .route("/api/download/:file_id", get(TtsController::download))
        .route("/api/preview", get(TtsController::preview))
        .route("/api/voices", get(TtsController::voices))
        .route("/api/cleanup", delete(TtsController::cleanup))
        .with_state(tts_controller);

    let health_routes = Router::new()
        .route("/api/health", get(health::health_storage))
        .with_state(tts_service);

    Router::new()
        .route("/", get(TtsController::root))
        .route("/health", get(health::health))
        .merge(health_routes)
        .merge(tts_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(config: Arc<Config>, app: Router) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
