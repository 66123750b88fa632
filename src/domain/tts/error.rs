use super::assembler::AssemblyError;
use crate::error::AppError;
use crate::infrastructure::repositories::{StorageError, SynthesisError};

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("text too large: {0}")]
    PayloadTooLarge(String),
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("audio assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TtsServiceError::PayloadTooLarge(msg) => AppError::PayloadTooLarge(msg),
            TtsServiceError::Synthesis(e) => AppError::ExternalService(e.to_string()),
            TtsServiceError::Storage(e) => AppError::ExternalService(e.to_string()),
            TtsServiceError::Assembly(e) => AppError::Internal(e.to_string()),
            TtsServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
