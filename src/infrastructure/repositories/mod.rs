pub mod audio_storage_repository;
pub mod openai_tts_repository;
pub mod polly_tts_repository;
pub mod tts_repository;

pub use audio_storage_repository::{AudioStorage, ObjectStoreAudioRepository, StorageError, StoredObject};
pub use openai_tts_repository::OpenAiTtsRepository;
pub use polly_tts_repository::PollyTtsRepository;
pub use tts_repository::{is_transient_status, SpeechSynthesizer, SynthesisError};
