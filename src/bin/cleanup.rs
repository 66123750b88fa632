//! One-shot retention sweep, for running from cron or a scheduled job.

use std::process::ExitCode;
use tts_backend::domain::tts::sweep_expired;
use tts_backend::infrastructure::clients::build_audio_storage;
use tts_backend::infrastructure::config::Config;
use tts_backend::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    // Only the bucket is touched, no synthesis engine credentials are needed
    let storage = match build_audio_storage(&config) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize cleanup");
            return ExitCode::FAILURE;
        }
    };

    let retention = config.retention();
    tracing::info!(
        bucket = %config.minio_bucket,
        retention_hours = config.cleanup_interval_hours,
        "Starting cleanup"
    );

    match sweep_expired(storage.as_ref(), retention, config.cleanup_concurrency).await {
        Ok(deleted) => {
            tracing::info!(deleted_count = deleted, "Cleanup completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Cleanup failed");
            ExitCode::FAILURE
        }
    }
}
