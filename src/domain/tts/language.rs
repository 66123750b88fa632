use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};
use serde::{Deserialize, Serialize};

/// ISO 639-1 language codes we have default voices and preview phrases for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ru")]
    Russian,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 7] = [
        LanguageCode::English,
        LanguageCode::Spanish,
        LanguageCode::French,
        LanguageCode::German,
        LanguageCode::Italian,
        LanguageCode::Portuguese,
        LanguageCode::Russian,
    ];

    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Italian => "it",
            LanguageCode::Portuguese => "pt",
            LanguageCode::Russian => "ru",
        }
    }

    /// Parse a language hint such as `en`, `EN` or `en-US`.
    /// Only the primary subtag is considered.
    pub fn from_hint(hint: &str) -> Option<Self> {
        let primary = hint.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        Self::ALL.into_iter().find(|code| code.as_str() == primary)
    }

    /// Convert lingua Language to LanguageCode
    #[allow(unreachable_patterns)]
    pub fn from_lingua(language: Language) -> Self {
        match language {
            Language::English => LanguageCode::English,
            Language::Spanish => LanguageCode::Spanish,
            Language::French => LanguageCode::French,
            Language::German => LanguageCode::German,
            Language::Italian => LanguageCode::Italian,
            Language::Portuguese => LanguageCode::Portuguese,
            Language::Russian => LanguageCode::Russian,
            _ => LanguageCode::English,
        }
    }

    /// Short canned phrase used for voice previews
    pub fn preview_phrase(&self) -> &'static str {
        match self {
            LanguageCode::English => "Hello, this is a voice preview. How does this sound?",
            LanguageCode::Spanish => "Hola, esta es una muestra de voz. ¿Qué te parece cómo suena?",
            LanguageCode::French => "Bonjour, ceci est un aperçu de la voix. Comment la trouvez-vous ?",
            LanguageCode::German => "Hallo, das ist eine Stimmprobe. Wie klingt das für Sie?",
            LanguageCode::Italian => "Ciao, questa è un'anteprima della voce. Come ti sembra?",
            LanguageCode::Portuguese => "Olá, esta é uma prévia da voz. O que você acha do som?",
            LanguageCode::Russian => "Привет, это пример голоса. Как вам звучание?",
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build a detector restricted to the languages we can voice
pub fn build_language_detector() -> LanguageDetector {
    let languages = vec![
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Russian,
    ];

    LanguageDetectorBuilder::from_languages(&languages).build()
}

/// Detect the language of the given text, falling back to English
pub fn detect_language(detector: &LanguageDetector, text: &str) -> LanguageCode {
    match detector.detect_language_of(text) {
        Some(language) => LanguageCode::from_lingua(language),
        None => {
            tracing::warn!("Could not detect language, falling back to English");
            LanguageCode::English
        }
    }
}
