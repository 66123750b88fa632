use super::assembler::assemble;
use super::dto::{GenerateRequest, VoiceDescriptor};
use super::error::TtsServiceError;
use super::language::{build_language_detector, detect_language, LanguageCode};
use super::normalizer::TextNormalizer;
use super::segmenter::segment;
use super::synthesis::{RetryPolicy, SynthesisClient};
use crate::infrastructure::repositories::{AudioStorage, SpeechSynthesizer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{future, stream, StreamExt};
use lingua::LanguageDetector;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const AUDIO_EXTENSION: &str = "mp3";

const VOICE_CATALOGUE_KEY: &str = "all";

/// Storage key for an artifact id
pub fn artifact_key(id: &Uuid) -> String {
    format!("{}.{}", id, AUDIO_EXTENSION)
}

/// Delete every stored artifact older than `retention`, at most
/// `concurrency` deletes in flight. Needs only the storage, so the one-shot
/// cleanup job can run without engine credentials.
pub async fn sweep_expired(
    storage: &dyn AudioStorage,
    retention: Duration,
    concurrency: usize,
) -> Result<usize, TtsServiceError> {
    if !storage.bucket_exists().await? {
        tracing::warn!("Storage bucket does not exist, nothing to sweep");
        return Ok(0);
    }

    let now = Utc::now();
    let cutoff = chrono::Duration::from_std(retention)
        .ok()
        .and_then(|retention| now.checked_sub_signed(retention))
        .ok_or_else(|| anyhow::anyhow!("retention window out of range: {:?}", retention))?;

    let expired: Vec<_> = storage
        .list(None)
        .await?
        .into_iter()
        .filter(|object| object.last_modified < cutoff)
        .collect();

    tracing::debug!(cutoff = %cutoff, expired_count = expired.len(), "Sweeping expired artifacts");

    // A failed delete is logged and skipped so one stuck object cannot block the rest
    let deleted = stream::iter(expired)
        .map(|object| async move {
            match storage.delete(&object.key).await {
                Ok(()) => {
                    tracing::info!(
                        key = %object.key,
                        age_secs = (now - object.last_modified).num_seconds(),
                        "Deleted expired artifact"
                    );
                    true
                }
                Err(e) => {
                    tracing::warn!(key = %object.key, error = %e, "Failed to delete expired artifact, skipping");
                    false
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter(|deleted| future::ready(*deleted))
        .count()
        .await;

    tracing::info!(deleted_count = deleted, "Cleanup completed");
    Ok(deleted)
}

/// Tunables for the generation pipeline and the retention sweep
#[derive(Debug, Clone)]
pub struct TtsSettings {
    pub max_text_chars: usize,
    /// Overrides the provider's own segment limit
    pub max_segment_chars: Option<usize>,
    pub synthesis_concurrency: usize,
    pub sweep_concurrency: usize,
    pub retention: Duration,
    pub retry: RetryPolicy,
    pub voice_cache_enabled: bool,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            max_text_chars: 50_000,
            max_segment_chars: None,
            synthesis_concurrency: 4,
            sweep_concurrency: 8,
            retention: Duration::from_secs(60 * 60),
            retry: RetryPolicy::default(),
            voice_cache_enabled: true,
        }
    }
}

/// A persisted audio object, as handed back to the caller
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub id: Uuid,
    pub key: String,
    pub download_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub size_bytes: usize,
    pub segment_count: usize,
}

/// Where a generation request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Received,
    Normalized,
    Segmented,
    Synthesizing,
    Assembled,
    Persisted,
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GenerationStage::Received => "received",
            GenerationStage::Normalized => "normalized",
            GenerationStage::Segmented => "segmented",
            GenerationStage::Synthesizing => "synthesizing",
            GenerationStage::Assembled => "assembled",
            GenerationStage::Persisted => "persisted",
        };
        write!(f, "{}", name)
    }
}

struct RenderedAudio {
    bytes: Vec<u8>,
    segment_count: usize,
}

pub struct TtsService {
    synthesis: SynthesisClient,
    storage: Arc<dyn AudioStorage>,
    normalizer: TextNormalizer,
    language_detector: LanguageDetector,
    voice_cache: Option<Cache<&'static str, Arc<Vec<VoiceDescriptor>>>>,
    settings: TtsSettings,
}

impl TtsService {
    pub fn new(
        engine: Arc<dyn SpeechSynthesizer>,
        storage: Arc<dyn AudioStorage>,
        normalizer: TextNormalizer,
        settings: TtsSettings,
    ) -> Self {
        let voice_cache = if settings.voice_cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(1)
                    .time_to_live(Duration::from_secs(60 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            synthesis: SynthesisClient::new(engine, settings.retry),
            storage,
            normalizer,
            language_detector: build_language_detector(),
            voice_cache,
            settings,
        }
    }

    fn engine(&self) -> &Arc<dyn SpeechSynthesizer> {
        self.synthesis.engine()
    }

    fn max_segment_chars(&self) -> usize {
        self.settings
            .max_segment_chars
            .unwrap_or_else(|| self.engine().max_segment_chars())
            .max(1)
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize text and persist the audio
    ///
    /// This operation:
    /// - Validates and cleans the text (no I/O happens for invalid input)
    /// - Splits it into provider-sized segments and synthesizes them with retry
    /// - Joins the segment audio in order and uploads one object
    ///
    /// Nothing is stored unless every step succeeds
    async fn generate(&self, request: GenerateRequest) -> Result<GeneratedArtifact, TtsServiceError>;

    /// Read a stored artifact; `Ok(None)` when it does not exist (or expired)
    async fn fetch(&self, id: &str) -> Result<Option<Vec<u8>>, TtsServiceError>;

    /// Delete every object strictly older than `retention`, returning how many were removed
    async fn sweep(&self, retention: Duration) -> Result<usize, TtsServiceError>;

    async fn list_voices(&self, language: Option<&str>) -> Result<Vec<VoiceDescriptor>, TtsServiceError>;

    /// Synthesize a canned phrase with the given voice, without storing it
    async fn preview_voice(&self, voice: &str, language: Option<&str>) -> Result<Vec<u8>, TtsServiceError>;

    /// Whether the storage bucket is reachable
    async fn storage_available(&self) -> bool;

    /// How long artifacts are kept before a sweep may remove them
    fn retention(&self) -> Duration;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn generate(&self, request: GenerateRequest) -> Result<GeneratedArtifact, TtsServiceError> {
        let id = Uuid::new_v4();
        let mut stage = GenerationStage::Received;

        tracing::info!(
            file_id = %id,
            text_length = request.text.chars().count(),
            voice = ?request.voice,
            language = ?request.language,
            "TTS generation request"
        );

        match self.run_generation(id, &request, &mut stage).await {
            Ok(artifact) => {
                tracing::info!(
                    file_id = %id,
                    key = %artifact.key,
                    size_bytes = artifact.size_bytes,
                    segment_count = artifact.segment_count,
                    expires_at = %artifact.expires_at,
                    "TTS artifact stored"
                );
                Ok(artifact)
            }
            Err(err) => {
                tracing::warn!(file_id = %id, failed_at = %stage, error = %err, "TTS generation failed");
                Err(err)
            }
        }
    }

    async fn fetch(&self, id: &str) -> Result<Option<Vec<u8>>, TtsServiceError> {
        // Only UUIDs are ever issued, anything else cannot exist
        let Ok(id) = Uuid::parse_str(id) else {
            tracing::debug!(file_id = id, "Rejected malformed artifact id");
            return Ok(None);
        };

        Ok(self.storage.get(&artifact_key(&id)).await?)
    }

    async fn sweep(&self, retention: Duration) -> Result<usize, TtsServiceError> {
        sweep_expired(self.storage.as_ref(), retention, self.settings.sweep_concurrency).await
    }

    async fn list_voices(&self, language: Option<&str>) -> Result<Vec<VoiceDescriptor>, TtsServiceError> {
        let catalogue = self.voice_catalogue().await?;

        let language = language.map(str::trim).filter(|l| !l.is_empty()).map(str::to_lowercase);
        let voices = match language {
            Some(language) => catalogue
                .iter()
                .filter(|voice| match &voice.locale {
                    Some(locale) => locale.to_lowercase().starts_with(&language),
                    None => true,
                })
                .cloned()
                .collect(),
            None => catalogue.as_ref().clone(),
        };

        Ok(voices)
    }

    async fn preview_voice(&self, voice: &str, language: Option<&str>) -> Result<Vec<u8>, TtsServiceError> {
        let voice = voice.trim();
        if voice.is_empty() {
            return Err(TtsServiceError::Invalid("Voice is required".to_string()));
        }

        let language = language
            .and_then(LanguageCode::from_hint)
            .unwrap_or(LanguageCode::English);
        let text = self.normalizer.normalize(language.preview_phrase());

        tracing::info!(voice = voice, language = %language, "Generating voice preview");

        let mut stage = GenerationStage::Normalized;
        let rendered = self.render(&text, voice, &mut stage).await?;
        Ok(rendered.bytes)
    }

    async fn storage_available(&self) -> bool {
        match self.storage.bucket_exists().await {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!("Storage bucket does not exist");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Storage health check failed");
                false
            }
        }
    }

    fn retention(&self) -> Duration {
        self.settings.retention
    }
}

impl TtsService {
    async fn run_generation(
        &self,
        id: Uuid,
        request: &GenerateRequest,
        stage: &mut GenerationStage,
    ) -> Result<GeneratedArtifact, TtsServiceError> {
        let text = self.validate_and_normalize(&request.text)?;
        *stage = GenerationStage::Normalized;

        let retention = chrono::Duration::from_std(self.settings.retention)
            .map_err(|e| anyhow::anyhow!("retention window out of range: {}", e))?;

        let voice = self.resolve_voice(request.voice.as_deref(), request.language.as_deref(), &text);
        tracing::debug!(file_id = %id, voice = %voice, cleaned_length = text.chars().count(), "Text normalized");

        let rendered = self.render(&text, &voice, stage).await?;

        let key = artifact_key(&id);
        let size_bytes = rendered.bytes.len();
        let created_at = Utc::now();
        let expires_at = created_at
            .checked_add_signed(retention)
            .ok_or_else(|| anyhow::anyhow!("expiry out of range for retention {}", retention))?;

        self.storage.put(&key, rendered.bytes).await?;
        *stage = GenerationStage::Persisted;

        Ok(GeneratedArtifact {
            id,
            download_url: format!("/api/download/{}", id),
            key,
            created_at,
            expires_at,
            size_bytes,
            segment_count: rendered.segment_count,
        })
    }

    /// Input checks happen before any engine or storage call
    fn validate_and_normalize(&self, text: &str) -> Result<String, TtsServiceError> {
        let char_count = text.chars().count();

        if text.trim().is_empty() {
            return Err(TtsServiceError::Invalid("Text cannot be empty".to_string()));
        }

        if char_count > self.settings.max_text_chars {
            return Err(TtsServiceError::PayloadTooLarge(format!(
                "Text must be {} characters or less",
                self.settings.max_text_chars
            )));
        }

        let cleaned = self.normalizer.normalize(text);
        if cleaned.is_empty() {
            return Err(TtsServiceError::Invalid("Text is empty after cleaning".to_string()));
        }

        Ok(cleaned)
    }

    /// Explicit voice, else the default voice for the hinted or detected language
    fn resolve_voice(&self, voice: Option<&str>, language: Option<&str>, text: &str) -> String {
        if let Some(voice) = voice.map(str::trim).filter(|v| !v.is_empty()) {
            return voice.to_string();
        }

        let language = language
            .and_then(LanguageCode::from_hint)
            .unwrap_or_else(|| detect_language(&self.language_detector, text));

        self.engine().default_voice(language)
    }

    /// Segment, synthesize and assemble already-normalized text
    async fn render(
        &self,
        text: &str,
        voice: &str,
        stage: &mut GenerationStage,
    ) -> Result<RenderedAudio, TtsServiceError> {
        let segments = segment(text, self.max_segment_chars());
        let segment_count = segments.len();
        *stage = GenerationStage::Segmented;
        tracing::debug!(segment_count = segment_count, "Text segmented");

        *stage = GenerationStage::Synthesizing;
        let audio = self
            .synthesis
            .synthesize_segments(segments, voice, self.settings.synthesis_concurrency)
            .await?;

        let bytes = assemble(audio)?;
        *stage = GenerationStage::Assembled;

        Ok(RenderedAudio { bytes, segment_count })
    }

    async fn voice_catalogue(&self) -> Result<Arc<Vec<VoiceDescriptor>>, TtsServiceError> {
        if let Some(cache) = &self.voice_cache {
            if let Some(cached) = cache.get(&VOICE_CATALOGUE_KEY).await {
                tracing::debug!(voice_count = cached.len(), "Voice catalogue cache hit");
                return Ok(cached);
            }
        }

        let voices = Arc::new(self.engine().list_voices().await?);

        if let Some(cache) = &self.voice_cache {
            cache.insert(VOICE_CATALOGUE_KEY, voices.clone()).await;
        }

        Ok(voices)
    }
}
