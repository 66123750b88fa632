use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request for POST /api/generate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Response for POST /api/generate
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub file_id: String,
    pub download_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Voice as reported by the synthesis provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    pub id: String,
    pub name: String,
    /// BCP 47 locale; `None` for multilingual voices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub engines: Vec<String>,
}

/// Query for GET /api/voices
#[derive(Debug, Default, Deserialize)]
pub struct VoicesQuery {
    pub language: Option<String>,
}

/// Response for GET /api/voices
#[derive(Debug, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceDescriptor>,
}

/// Query for GET /api/preview
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub voice: String,
    pub language: Option<String>,
}

/// Response for DELETE /api/cleanup
#[derive(Debug, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub deleted: usize,
    pub message: String,
}
