//! Construction of external clients from configuration

use async_openai::{config::OpenAIConfig, Client as OpenAiClient};
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use object_store::{aws::AmazonS3Builder, ObjectStore};
use std::sync::Arc;

use crate::domain::tts::{TextNormalizer, TtsService};
use crate::infrastructure::config::{Config, TtsProvider};
use crate::infrastructure::repositories::{
    AudioStorage, ObjectStoreAudioRepository, OpenAiTtsRepository, PollyTtsRepository, SpeechSynthesizer,
};

/// S3 client for the MinIO (or AWS) bucket holding generated audio
pub fn build_object_store(config: &Config) -> Result<Arc<dyn ObjectStore>, object_store::Error> {
    let store = AmazonS3Builder::new()
        .with_endpoint(config.minio_url())
        .with_bucket_name(&config.minio_bucket)
        .with_access_key_id(&config.minio_access_key)
        .with_secret_access_key(&config.minio_secret_key)
        .with_region(&config.aws_region)
        .with_allow_http(!config.minio_secure)
        .with_virtual_hosted_style_request(false)
        .build()?;

    tracing::info!(
        endpoint = %config.minio_url(),
        bucket = %config.minio_bucket,
        "Object store client initialized"
    );

    Ok(Arc::new(store))
}

/// Synthesis engine selected by `TTS_PROVIDER`
pub async fn build_speech_synthesizer(config: &Config) -> Result<Arc<dyn SpeechSynthesizer>, Box<dyn std::error::Error>> {
    match config.tts_provider {
        TtsProvider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;
            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));

            Ok(Arc::new(PollyTtsRepository::new(polly_client)))
        }
        TtsProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or("OPENAI_API_KEY is required when TTS_PROVIDER=openai")?;
            tracing::info!(model = %config.openai_tts_model, "Initializing OpenAI TTS client");

            let client = Arc::new(OpenAiClient::with_config(OpenAIConfig::new().with_api_key(api_key)));

            Ok(Arc::new(OpenAiTtsRepository::new(
                client,
                config.openai_tts_model.clone(),
                config.openai_tts_voice.clone(),
            )))
        }
    }
}

/// S3 API client used for bucket administration against the same endpoint
pub fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        config.minio_access_key.clone(),
        config.minio_secret_key.clone(),
        None,
        None,
        "minio",
    );

    let s3_config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .endpoint_url(config.minio_url())
        .credentials_provider(credentials)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

/// Artifact storage backed by the configured bucket
pub fn build_audio_storage(config: &Config) -> Result<Arc<dyn AudioStorage>, object_store::Error> {
    let repository = ObjectStoreAudioRepository::new(build_object_store(config)?, config.minio_bucket.clone())
        .with_s3_client(Arc::new(build_s3_client(config)), config.aws_region.clone());

    Ok(Arc::new(repository))
}

/// Wire the TTS service with its engine, storage and settings
pub async fn build_tts_service(
    config: &Config,
    storage: Arc<dyn AudioStorage>,
) -> Result<Arc<TtsService>, Box<dyn std::error::Error>> {
    let engine = build_speech_synthesizer(config).await?;

    Ok(Arc::new(TtsService::new(
        engine,
        storage,
        TextNormalizer::default(),
        config.tts_settings(),
    )))
}
