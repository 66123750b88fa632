use crate::domain::tts::{LanguageCode, VoiceDescriptor};
use async_trait::async_trait;

/// Failure reported by a synthesis provider, classified for retry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SynthesisError {
    /// Network failure, timeout, throttling or a provider-side 5xx.
    #[error("transient synthesis failure: {0}")]
    Transient(String),
    /// The provider refused the request itself (unknown voice, bad input).
    #[error("synthesis rejected: {0}")]
    Rejected(String),
}

impl SynthesisError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SynthesisError::Transient(_))
    }
}

/// HTTP statuses worth another attempt: throttling, timeouts and server errors.
pub fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || status >= 500
}

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (AWS Polly, OpenAI, ...)
///
/// Implementations synthesize one engine-sized piece of text per call.
/// Splitting, retrying and merging are done by the domain pipeline.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &'static str;

    /// Largest text length (in chars) the provider accepts per request
    fn max_segment_chars(&self) -> usize;

    /// Voice used when the caller does not pick one
    fn default_voice(&self, language: LanguageCode) -> String;

    /// Synthesize text with the given voice
    ///
    /// Returns MP3 encoded audio
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError>;

    /// Full voice catalogue of the provider
    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, SynthesisError>;
}
