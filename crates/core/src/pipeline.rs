use crate::inference::{GenerativeBackend, InferenceClient};
use crate::types::{CorrectionReport, LanguageCode, ResponseBundle};
use crate::{detect, grammar, phrasebook};
use thiserror::Error;

/// The only error surfaced to the transport layer. Everything downstream of
/// input validation is absorbed by per-component fallback policies.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("message is empty")]
    EmptyMessage,
}

/// Sequences language detection, reply generation, grammar analysis, and
/// translation into one response bundle.
///
/// Holds no per-request state; a single instance can serve concurrent
/// requests.
pub struct Pipeline<B> {
    client: InferenceClient<B>,
}

impl<B: GenerativeBackend> Pipeline<B> {
    pub fn new(client: InferenceClient<B>) -> Self {
        Self { client }
    }

    /// Processes one learner message into a fully populated bundle.
    ///
    /// Translation targets the complement of the detected language within
    /// the English↔Indonesian pair: detected English translates toward
    /// Indonesian, anything else toward English.
    ///
    /// # Examples
    ///
    /// ```
    /// use linguaroom_core::inference::{InferenceClient, MockBackend};
    /// use linguaroom_core::pipeline::Pipeline;
    ///
    /// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
    /// let pipeline = Pipeline::new(InferenceClient::new(MockBackend, 3));
    /// let bundle = pipeline.process("im happy today").await?;
    /// assert_eq!(bundle.correction.corrected, "Im happy today.");
    /// assert!(!bundle.reply.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn process(&self, message: &str) -> Result<ResponseBundle, ProcessingError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ProcessingError::EmptyMessage);
        }

        let language = detect::detect(message);
        let reply = self.client.generate(message, language).await;
        let correction = grammar::analyze(message);
        let target = if language == LanguageCode::En {
            LanguageCode::Id
        } else {
            LanguageCode::En
        };
        let translation = phrasebook::translate(message, target);
        let grammar_formula = correction.pattern.to_string();

        Ok(ResponseBundle {
            reply,
            correction,
            translation,
            language,
            grammar_formula,
        })
    }
}

/// Grammar correction plus translation toward an explicit target language,
/// with no inference call. Backs the correction-only operation.
pub fn correct(message: &str, target: LanguageCode) -> Result<CorrectionReport, ProcessingError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ProcessingError::EmptyMessage);
    }
    Ok(CorrectionReport {
        correction: grammar::analyze(message),
        translation: phrasebook::translate(message, target),
    })
}
