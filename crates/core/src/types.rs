use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Language classification attached to a learner message by [`crate::detect`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub enum LanguageCode {
    #[serde(rename = "English")]
    En,
    #[serde(rename = "Japanese")]
    Ja,
    #[serde(rename = "Chinese")]
    Zh,
    #[serde(rename = "Indonesian")]
    Id,
    #[serde(rename = "Unknown")]
    Other,
}

impl LanguageCode {
    /// Short tag used in configuration, flags, and logs.
    pub fn code(self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Ja => "ja",
            LanguageCode::Zh => "zh",
            LanguageCode::Id => "id",
            LanguageCode::Other => "other",
        }
    }

    /// Parses a short tag back into a code. Only tutored languages are
    /// accepted; `other` is a detection outcome, not a valid target.
    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" => Some(LanguageCode::En),
            "ja" => Some(LanguageCode::Ja),
            "zh" => Some(LanguageCode::Zh),
            "id" => Some(LanguageCode::Id),
            _ => None,
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LanguageCode::En => "English",
            LanguageCode::Ja => "Japanese",
            LanguageCode::Zh => "Chinese",
            LanguageCode::Id => "Indonesian",
            LanguageCode::Other => "Unknown",
        };
        f.write_str(name)
    }
}

/// Coarse sentence-pattern label produced by [`crate::grammar::analyze`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum GrammarPattern {
    #[serde(rename = "Single word")]
    SingleWord,
    #[serde(rename = "Subject + Be + Complement")]
    SubjectBeComplement,
    #[serde(rename = "Question form")]
    QuestionForm,
    #[serde(rename = "Subject + Verb + Object")]
    SubjectVerbObject,
}

impl fmt::Display for GrammarPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GrammarPattern::SingleWord => "Single word",
            GrammarPattern::SubjectBeComplement => "Subject + Be + Complement",
            GrammarPattern::QuestionForm => "Question form",
            GrammarPattern::SubjectVerbObject => "Subject + Verb + Object",
        };
        f.write_str(label)
    }
}

/// Naive correction of one learner message, created once and never mutated.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CorrectionResult {
    pub original: String,
    pub corrected: String,
    pub is_correct: bool,
    pub pattern: GrammarPattern,
}

/// Outcome of a phrasebook lookup. A miss is an explicit marker, never an
/// empty string standing in for failure.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Translation {
    Text(String),
    Unavailable,
}

impl Translation {
    pub fn is_available(&self) -> bool {
        matches!(self, Translation::Text(_))
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translation::Text(text) => f.write_str(text),
            Translation::Unavailable => f.write_str("Translation not available"),
        }
    }
}

impl Serialize for Translation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Complete output of one pipeline invocation. Every field is always
/// populated; fallback policies guarantee `reply` and `translation` exist
/// even when the inference service is unreachable.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseBundle {
    pub reply: String,
    pub correction: CorrectionResult,
    pub translation: Translation,
    pub language: LanguageCode,
    pub grammar_formula: String,
}

/// Output of the correction-only operation: grammar feedback plus a phrase
/// translation toward an explicit target language.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionReport {
    pub correction: CorrectionResult,
    pub translation: Translation,
}

/// Settings for the external text-generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key_env_var: String,
    pub max_length: u32,
    pub temperature: f32,
    pub do_sample: bool,
    pub timeout_ms: u64,
    pub max_attempts: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model: "microsoft/DialoGPT-medium".to_string(),
            api_key_env_var: "HUGGINGFACE_API_KEY".to_string(),
            max_length: 100,
            temperature: 0.7,
            do_sample: true,
            timeout_ms: 10_000,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: String,
    pub inference: InferenceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: "huggingface".to_string(),
            inference: InferenceConfig::default(),
        }
    }
}
