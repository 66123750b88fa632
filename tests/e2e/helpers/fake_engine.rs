use async_trait::async_trait;
use parking_lot::Mutex;
use tts_backend::domain::tts::{LanguageCode, VoiceDescriptor};
use tts_backend::infrastructure::repositories::{SpeechSynthesizer, SynthesisError};

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, stereo: 417 byte frames
pub const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
pub const FRAME_LEN: usize = 417;

/// Voice the engine refuses, to exercise terminal provider errors
pub const REJECTED_VOICE: &str = "Nobody";

pub fn audio_frame(fill: u8) -> Vec<u8> {
    let mut frame = FRAME_HEADER.to_vec();
    frame.resize(FRAME_LEN, fill);
    frame
}

fn info_frame() -> Vec<u8> {
    let mut frame = audio_frame(0);
    frame[36..40].copy_from_slice(b"Info");
    frame
}

/// Answers like a real MP3 encoder: an Info header frame, then one audio frame
#[derive(Default)]
pub struct FakeEngine {
    pub calls: Mutex<Vec<(String, String)>>,
    pub max_chars: Option<usize>,
}

impl FakeEngine {
    pub fn output_for(text: &str) -> Vec<u8> {
        let mut out = info_frame();
        out.extend(audio_frame((text.len() % 251) as u8));
        out
    }

    #[allow(dead_code)]
    pub fn texts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(text, _)| text.clone()).collect()
    }

    #[allow(dead_code)]
    pub fn voices(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(_, voice)| voice.clone()).collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn max_segment_chars(&self) -> usize {
        self.max_chars.unwrap_or(3000)
    }

    fn default_voice(&self, language: LanguageCode) -> String {
        match language {
            LanguageCode::Spanish => "Lucia".to_string(),
            LanguageCode::Russian => "Tatyana".to_string(),
            _ => "Joanna".to_string(),
        }
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        self.calls.lock().push((text.to_string(), voice.to_string()));
        if voice == REJECTED_VOICE {
            return Err(SynthesisError::Rejected(format!("voice {} does not exist", voice)));
        }
        Ok(Self::output_for(text))
    }

    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, SynthesisError> {
        let voice = |id: &str, locale: &str, gender: &str| VoiceDescriptor {
            id: id.to_string(),
            name: id.to_string(),
            locale: Some(locale.to_string()),
            gender: Some(gender.to_string()),
            engines: vec!["neural".to_string()],
        };

        Ok(vec![
            voice("Joanna", "en-US", "Female"),
            voice("Matthew", "en-US", "Male"),
            voice("Lucia", "es-ES", "Female"),
            voice("Tatyana", "ru-RU", "Female"),
        ])
    }
}
