use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    domain::tts::{
        CleanupResponse, GenerateRequest, GenerateResponse, PreviewQuery, TtsServiceApi, VoicesQuery,
        VoicesResponse,
    },
    error::{AppError, AppResult},
};

const AUDIO_MPEG: &str = "audio/mpeg";

pub struct TtsController {
    tts_service: Arc<dyn TtsServiceApi>,
}

impl TtsController {
    pub fn new(tts_service: Arc<dyn TtsServiceApi>) -> Self {
        Self { tts_service }
    }

    /// GET / - Service banner
    pub async fn root() -> Json<Value> {
        Json(json!({
            "message": "TTS Service API",
            "version": env!("CARGO_PKG_VERSION"),
        }))
    }

    /// POST /api/generate - Synthesize text and store the audio
    pub async fn generate(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<GenerateRequest>,
    ) -> AppResult<Json<GenerateResponse>> {
        let artifact = controller.tts_service.generate(request).await?;

        Ok(Json(GenerateResponse {
            file_id: artifact.id.to_string(),
            download_url: artifact.download_url,
            expires_at: artifact.expires_at,
        }))
    }

    /// GET /api/download/:file_id - Stream a stored artifact
    pub async fn download(
        State(controller): State<Arc<TtsController>>,
        Path(file_id): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let audio = controller
            .tts_service
            .fetch(&file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        tracing::info!(file_id = %file_id, size_bytes = audio.len(), "Serving audio download");

        let disposition = format!("attachment; filename=\"{}.mp3\"", file_id);
        Ok((StatusCode::OK, audio_headers(&disposition)?, Body::from(audio)))
    }

    /// GET /api/preview - Synthesize a sample phrase with a voice
    pub async fn preview(
        State(controller): State<Arc<TtsController>>,
        Query(query): Query<PreviewQuery>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let audio = controller
            .tts_service
            .preview_voice(&query.voice, query.language.as_deref())
            .await?;

        Ok((
            StatusCode::OK,
            audio_headers("inline; filename=preview.mp3")?,
            Body::from(audio),
        ))
    }

    /// GET /api/voices - List the provider's voices, optionally by language
    pub async fn voices(
        State(controller): State<Arc<TtsController>>,
        Query(query): Query<VoicesQuery>,
    ) -> AppResult<Json<VoicesResponse>> {
        let voices = controller
            .tts_service
            .list_voices(query.language.as_deref())
            .await?;

        Ok(Json(VoicesResponse { voices }))
    }

    /// DELETE /api/cleanup - Run a retention sweep now
    pub async fn cleanup(State(controller): State<Arc<TtsController>>) -> AppResult<Json<CleanupResponse>> {
        let retention = controller.tts_service.retention();
        let deleted = controller.tts_service.sweep(retention).await?;

        Ok(Json(CleanupResponse {
            deleted,
            message: "Cleanup completed".to_string(),
        }))
    }
}

fn audio_headers(disposition: &str) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(AUDIO_MPEG));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(disposition)
            .map_err(|e| AppError::Internal(format!("invalid content disposition: {}", e)))?,
    );
    Ok(headers)
}
