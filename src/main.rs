use std::sync::Arc;
use tts_backend::domain::tts::TtsServiceApi;
use tts_backend::infrastructure::cleanup::spawn_cleanup_task;
use tts_backend::infrastructure::clients::{build_audio_storage, build_tts_service};
use tts_backend::infrastructure::config::Config;
use tts_backend::infrastructure::http::{build_router, start_http_server};
use tts_backend::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        provider = ?config.tts_provider,
        "Starting TTS Backend on {}:{}",
        config.host,
        config.port
    );

    let storage = build_audio_storage(&config)?;

    // An unreachable store degrades health but is not fatal
    match storage.ensure_bucket().await {
        Ok(true) => tracing::info!(bucket = %config.minio_bucket, "Storage bucket created"),
        Ok(false) => tracing::info!(bucket = %config.minio_bucket, "Storage bucket verified"),
        Err(e) => tracing::warn!(
            bucket = %config.minio_bucket,
            error = %e,
            "Storage bucket not reachable, generation will fail until it exists"
        ),
    }

    let tts_service: Arc<dyn TtsServiceApi> = build_tts_service(&config, storage).await?;

    let cleanup_handle = config
        .cleanup_schedule()
        .map(|period| spawn_cleanup_task(tts_service.clone(), config.retention(), period));
    if cleanup_handle.is_none() {
        tracing::info!("Scheduled cleanup disabled");
    }

    let config = Arc::new(config);
    let app = build_router(tts_service);

    let result = start_http_server(config, app).await;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }

    result
}
