use super::tts_repository::{SpeechSynthesizer, SynthesisError};
use crate::domain::tts::{LanguageCode, VoiceDescriptor};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
const MAX_BATCH_SIZE: usize = 4096;

const VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

/// OpenAI TTS implementation of the speech synthesizer
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    default_voice: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String, default_voice: String) -> Self {
        Self {
            client,
            model,
            default_voice,
        }
    }

    /// Select the appropriate OpenAI voice for a language
    /// Based on voice characteristics that suit each language
    fn get_voice_for_language(language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::English => "alloy",
            LanguageCode::Spanish => "echo",
            LanguageCode::French => "nova",
            LanguageCode::German => "onyx",
            LanguageCode::Italian => "fable",
            LanguageCode::Portuguese => "shimmer",
            LanguageCode::Russian => "onyx",
        }
    }

    fn parse_voice(voice: &str) -> Option<Voice> {
        match voice.to_lowercase().as_str() {
            "alloy" => Some(Voice::Alloy),
            "echo" => Some(Voice::Echo),
            "fable" => Some(Voice::Fable),
            "onyx" => Some(Voice::Onyx),
            "nova" => Some(Voice::Nova),
            "shimmer" => Some(Voice::Shimmer),
            _ => None,
        }
    }

    fn parse_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }
}

fn classify(err: &OpenAIError) -> bool {
    match err {
        OpenAIError::ApiError(api) => api.r#type.as_deref() != Some("invalid_request_error"),
        OpenAIError::InvalidArgument(_) => false,
        _ => true,
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiTtsRepository {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn max_segment_chars(&self) -> usize {
        MAX_BATCH_SIZE
    }

    fn default_voice(&self, language: LanguageCode) -> String {
        if self.default_voice.is_empty() {
            Self::get_voice_for_language(language).to_string()
        } else {
            self.default_voice.clone()
        }
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        // An unknown voice will never succeed, so it is not worth a retry
        let voice_enum = Self::parse_voice(voice)
            .ok_or_else(|| SynthesisError::Rejected(format!("Unknown OpenAI voice: {}", voice)))?;

        tracing::info!(
            model = %self.model,
            voice = voice,
            text_length = text.len(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.parse_model(),
            input: text.to_string(),
            voice: voice_enum,
            response_format: None, // Defaults to MP3
            speed: None,           // Defaults to 1.0
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            let transient = classify(&e);
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = voice,
                text_length = text.len(),
                transient = transient,
                "OpenAI TTS API call failed"
            );
            let message = format!("OpenAI TTS error: {}", e);
            if transient {
                SynthesisError::Transient(message)
            } else {
                SynthesisError::Rejected(message)
            }
        })?;

        let audio_bytes = response.bytes.to_vec();
        tracing::debug!(audio_size = audio_bytes.len(), "OpenAI TTS audio received");

        Ok(audio_bytes)
    }

    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, SynthesisError> {
        // OpenAI voices are multilingual and not exposed through an endpoint
        Ok(VOICES
            .iter()
            .map(|voice| VoiceDescriptor {
                id: voice.to_string(),
                name: voice.to_string(),
                locale: None,
                gender: None,
                engines: vec![self.model.clone()],
            })
            .collect())
    }
}
