use super::tts_repository::{is_transient_status, SpeechSynthesizer, SynthesisError};
use crate::domain::tts::{LanguageCode, VoiceDescriptor};
use async_trait::async_trait;
use aws_sdk_polly::{
    error::SdkError,
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request
const MAX_BATCH_SIZE: usize = 3000;

/// AWS Polly implementation of the speech synthesizer
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    /// Select the appropriate Polly voice for a language
    fn get_voice_for_language(language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::English => "Joanna",
            LanguageCode::Spanish => "Lupe",
            LanguageCode::French => "Lea",
            LanguageCode::German => "Vicki",
            LanguageCode::Italian => "Bianca",
            LanguageCode::Portuguese => "Ines",
            LanguageCode::Russian => "Tatyana",
        }
    }

    /// Pick the neural engine when the voice supports it
    fn engine_for_voice(voice: &str) -> Engine {
        if is_voice_neural_compatible(voice) {
            Engine::Neural
        } else {
            Engine::Standard
        }
    }
}

/// Check if a voice supports neural engine
pub fn is_voice_neural_compatible(voice: &str) -> bool {
    // Based on AWS Polly documentation
    const NEURAL_VOICES: &[&str] = &[
        // English
        "Joanna", "Matthew", "Ivy", "Kendra", "Kimberly", "Salli", "Joey", "Justin", "Kevin",
        "Ruth", "Stephen", "Amy", "Emma", "Brian", "Arthur", "Olivia",
        // Spanish
        "Lupe", "Pedro", "Sergio", "Lucia", "Mia", "Andres",
        // French
        "Lea", "Remi", "Gabrielle", "Liam",
        // German
        "Vicki", "Daniel",
        // Italian
        "Bianca", "Adriano",
        // Portuguese
        "Ines", "Camila", "Vitoria", "Thiago",
    ];

    NEURAL_VOICES.contains(&voice)
}

#[async_trait]
impl SpeechSynthesizer for PollyTtsRepository {
    fn name(&self) -> &'static str {
        "polly"
    }

    fn max_segment_chars(&self) -> usize {
        MAX_BATCH_SIZE
    }

    fn default_voice(&self, language: LanguageCode) -> String {
        Self::get_voice_for_language(language).to_string()
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        let voice_id = VoiceId::from(voice);
        let engine = Self::engine_for_voice(voice);

        tracing::info!(
            voice = voice,
            engine = ?engine,
            output_format = "Mp3",
            text_length = text.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                let transient = match &e {
                    SdkError::ServiceError(ctx) => is_transient_status(ctx.raw().status().as_u16()),
                    SdkError::ConstructionFailure(_) => false,
                    _ => true,
                };
                tracing::error!(
                    error = %e,
                    voice = voice,
                    engine = ?engine,
                    text_length = text.len(),
                    transient = transient,
                    "AWS Polly synthesize_speech failed"
                );
                let message = format!("AWS Polly error: {}", aws_sdk_polly::error::DisplayErrorContext(&e));
                if transient {
                    SynthesisError::Transient(message)
                } else {
                    SynthesisError::Rejected(message)
                }
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            SynthesisError::Transient(format!("Failed to read audio stream: {}", e))
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        tracing::debug!(audio_size = audio_bytes.len(), "Polly audio stream collected");

        Ok(audio_bytes)
    }

    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, SynthesisError> {
        let mut voices = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .polly_client
                .describe_voices()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "AWS Polly describe_voices failed");
                    let message = format!("AWS Polly error: {}", aws_sdk_polly::error::DisplayErrorContext(&e));
                    match &e {
                        SdkError::ServiceError(ctx) if !is_transient_status(ctx.raw().status().as_u16()) => {
                            SynthesisError::Rejected(message)
                        }
                        _ => SynthesisError::Transient(message),
                    }
                })?;

            for voice in output.voices() {
                let Some(id) = voice.id() else { continue };
                voices.push(VoiceDescriptor {
                    id: id.as_str().to_string(),
                    name: voice.name().unwrap_or(id.as_str()).to_string(),
                    locale: voice.language_code().map(|code| code.as_str().to_string()),
                    gender: voice.gender().map(|gender| gender.as_str().to_string()),
                    engines: voice
                        .supported_engines()
                        .iter()
                        .map(|engine| engine.as_str().to_string())
                        .collect(),
                });
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!(voice_count = voices.len(), "Polly voice catalogue loaded");
        Ok(voices)
    }
}
