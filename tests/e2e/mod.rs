// End-to-end tests for the TTS Backend HTTP API
//
// Each test starts the real router on an ephemeral port, backed by an
// in-memory object store and a scripted synthesis engine that emits valid
// MP3 frames. No network services are needed.

mod helpers;
mod test_cleanup;
mod test_health;
mod test_tts;
mod test_voices;
