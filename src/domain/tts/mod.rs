pub mod assembler;
pub mod dto;
pub mod error;
pub mod language;
pub mod normalizer;
pub mod segmenter;
pub mod service;
pub mod synthesis;

pub use assembler::{assemble, AssemblyError, SegmentAudio};
pub use dto::{
    CleanupResponse, GenerateRequest, GenerateResponse, PreviewQuery, VoiceDescriptor, VoicesQuery,
    VoicesResponse,
};
pub use error::TtsServiceError;
pub use language::{detect_language, LanguageCode};
pub use normalizer::{AbbreviationTable, TextNormalizer};
pub use segmenter::{segment, Segment};
pub use service::{artifact_key, sweep_expired, GeneratedArtifact, TtsService, TtsServiceApi, TtsSettings};
pub use synthesis::{RetryPolicy, SynthesisClient};
