use crate::domain::tts::{RetryPolicy, TtsSettings};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    // Synthesis provider
    pub tts_provider: TtsProvider,
    pub aws_region: String,
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub openai_tts_voice: String,
    // Object storage
    pub minio_endpoint: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub minio_bucket: String,
    pub minio_secure: bool,
    // Retention
    pub cleanup_interval_hours: u64,
    pub cleanup_schedule_minutes: u64,
    pub cleanup_concurrency: usize,
    // Pipeline
    pub tts_synthesis_concurrency: usize,
    pub tts_max_retries: u32,
    pub tts_retry_base_delay_ms: u64,
    pub tts_max_segment_chars: Option<usize>,
    pub tts_max_text_chars: usize,
    pub voice_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    Polly,
    OpenAi,
}

fn hours_to_secs(hours: u64) -> Option<u64> {
    hours.checked_mul(60 * 60)
}

fn minutes_to_secs(minutes: u64) -> Option<u64> {
    minutes.checked_mul(60)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            tts_provider: match env::var("TTS_PROVIDER")
                .unwrap_or_else(|_| "polly".to_string())
                .to_lowercase()
                .as_str()
            {
                "polly" => TtsProvider::Polly,
                "openai" => TtsProvider::OpenAi,
                other => return Err(format!("unknown TTS_PROVIDER '{}'", other).into()),
            },
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_tts_model: env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            openai_tts_voice: env::var("OPENAI_TTS_VOICE").unwrap_or_default(),
            minio_endpoint: env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "minio:9000".to_string()),
            minio_access_key: env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            minio_secret_key: env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            minio_bucket: env::var("MINIO_BUCKET").unwrap_or_else(|_| "tts-audio".to_string()),
            minio_secure: parse_bool(&env::var("MINIO_SECURE").unwrap_or_else(|_| "false".to_string())),
            cleanup_interval_hours: env::var("CLEANUP_INTERVAL_HOURS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            cleanup_schedule_minutes: env::var("CLEANUP_SCHEDULE_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()?,
            cleanup_concurrency: env::var("CLEANUP_CONCURRENCY")
                .unwrap_or_else(|_| "8".to_string())
                .parse()?,
            tts_synthesis_concurrency: env::var("TTS_SYNTHESIS_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
            tts_max_retries: env::var("TTS_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            tts_retry_base_delay_ms: env::var("TTS_RETRY_BASE_DELAY_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()?,
            tts_max_segment_chars: match env::var("TTS_MAX_SEGMENT_CHARS") {
                Ok(value) if !value.trim().is_empty() => Some(value.trim().parse()?),
                _ => None,
            },
            tts_max_text_chars: env::var("TTS_MAX_TEXT_CHARS")
                .unwrap_or_else(|_| "50000".to_string())
                .parse()?,
            voice_cache_enabled: parse_bool(
                &env::var("VOICE_CACHE_ENABLED").unwrap_or_else(|_| "true".to_string()),
            ),
        };

        config.validate()?;

        Ok(config)
    }

    /// Reject durations that overflow once converted to seconds or timestamps
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        let retention = hours_to_secs(self.cleanup_interval_hours)
            .ok_or_else(|| format!("CLEANUP_INTERVAL_HOURS={} is out of range", self.cleanup_interval_hours))?;
        chrono::Duration::from_std(Duration::from_secs(retention))
            .map_err(|_| format!("CLEANUP_INTERVAL_HOURS={} is out of range", self.cleanup_interval_hours))?;

        minutes_to_secs(self.cleanup_schedule_minutes)
            .ok_or_else(|| format!("CLEANUP_SCHEDULE_MINUTES={} is out of range", self.cleanup_schedule_minutes))?;

        Ok(())
    }

    /// How long a stored artifact is kept
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_hours.saturating_mul(60 * 60))
    }

    /// Period of the background sweeper; `None` when disabled
    pub fn cleanup_schedule(&self) -> Option<Duration> {
        (self.cleanup_schedule_minutes > 0)
            .then(|| Duration::from_secs(self.cleanup_schedule_minutes.saturating_mul(60)))
    }

    /// Pipeline and sweep tunables handed to the TTS service
    pub fn tts_settings(&self) -> TtsSettings {
        TtsSettings {
            max_text_chars: self.tts_max_text_chars,
            max_segment_chars: self.tts_max_segment_chars,
            synthesis_concurrency: self.tts_synthesis_concurrency,
            sweep_concurrency: self.cleanup_concurrency,
            retention: self.retention(),
            retry: RetryPolicy {
                max_attempts: self.tts_max_retries,
                base_delay: Duration::from_millis(self.tts_retry_base_delay_ms),
            },
            voice_cache_enabled: self.voice_cache_enabled,
        }
    }

    /// Endpoint URL for the S3 client, scheme derived from `MINIO_SECURE`
    pub fn minio_url(&self) -> String {
        if self.minio_endpoint.starts_with("http://") || self.minio_endpoint.starts_with("https://") {
            return self.minio_endpoint.clone();
        }
        let scheme = if self.minio_secure { "https" } else { "http" };
        format!("{}://{}", scheme, self.minio_endpoint)
    }
}
