//! Retention sweeper task
//!
//! Periodically deletes stored audio older than the retention window.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::tts::TtsServiceApi;

/// Spawn a background task that runs a retention sweep every `period`.
///
/// The first sweep happens one period after startup. A failed sweep is
/// logged and the next tick tries again. Abort the returned handle on
/// shutdown.
pub fn spawn_cleanup_task(
    tts_service: Arc<dyn TtsServiceApi>,
    retention: Duration,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tracing::info!(
        retention_secs = retention.as_secs(),
        period_secs = period.as_secs(),
        "Starting audio cleanup task"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // Don't run immediately on startup
        ticker.tick().await;

        loop {
            ticker.tick().await;

            tracing::debug!(retention_secs = retention.as_secs(), "Running scheduled cleanup");

            match tts_service.sweep(retention).await {
                Ok(0) => tracing::debug!("No expired audio to clean up"),
                Ok(deleted) => tracing::info!(deleted_count = deleted, "Scheduled cleanup removed expired audio"),
                Err(e) => tracing::error!(error = %e, "Scheduled cleanup failed"),
            }
        }
    })
}
