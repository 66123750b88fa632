use super::assembler::SegmentAudio;
use super::segmenter::Segment;
use crate::infrastructure::repositories::{SpeechSynthesizer, SynthesisError};
use futures::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Linear backoff: the wait after zero-based attempt `n` is `(n + 1) * base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of calls, first one included
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

/// Calls the synthesis provider with retry and bounded fan-out.
#[derive(Clone)]
pub struct SynthesisClient {
    engine: Arc<dyn SpeechSynthesizer>,
    policy: RetryPolicy,
}

impl SynthesisClient {
    pub fn new(engine: Arc<dyn SpeechSynthesizer>, policy: RetryPolicy) -> Self {
        Self { engine, policy }
    }

    pub fn engine(&self) -> &Arc<dyn SpeechSynthesizer> {
        &self.engine
    }

    /// Synthesize one piece of text, retrying transient failures only.
    pub async fn synthesize_one(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match self.engine.synthesize(text, voice).await {
                Ok(audio) => {
                    if attempt > 0 {
                        tracing::debug!(attempts = attempt + 1, "Synthesis succeeded after retries");
                    }
                    return Ok(audio);
                }
                Err(err) if !err.is_retryable() => {
                    tracing::error!(
                        provider = self.engine.name(),
                        attempts = attempt + 1,
                        error = %err,
                        "Synthesis rejected, not retrying"
                    );
                    return Err(err);
                }
                Err(err) if attempt + 1 >= max_attempts => {
                    tracing::error!(
                        provider = self.engine.name(),
                        attempts = attempt + 1,
                        error = %err,
                        "Synthesis failed after max attempts"
                    );
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.policy.delay_for_attempt(attempt);
                    tracing::warn!(
                        provider = self.engine.name(),
                        attempt = attempt + 1,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Synthesis failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Synthesize every segment with at most `concurrency` calls in flight.
    ///
    /// Results come back in completion order; the first failure drops the
    /// remaining in-flight calls.
    pub async fn synthesize_segments(
        &self,
        segments: Vec<Segment>,
        voice: &str,
        concurrency: usize,
    ) -> Result<Vec<SegmentAudio>, SynthesisError> {
        stream::iter(segments)
            .map(|segment| async move {
                tracing::debug!(
                    segment_index = segment.index,
                    segment_chars = segment.text.chars().count(),
                    "Synthesizing segment"
                );
                let bytes = self.synthesize_one(&segment.text, voice).await?;
                Ok::<_, SynthesisError>(SegmentAudio {
                    index: segment.index,
                    bytes,
                })
            })
            .buffer_unordered(concurrency.max(1))
            .try_collect()
            .await
    }
}
