use crate::fallback;
use crate::types::{InferenceConfig, LanguageCode};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failures of a single generation attempt. Every variant is absorbed by
/// [`InferenceClient::generate`]; they surface only in logs.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("endpoint returned status {0}")]
    Status(u16),
    #[error("response payload invalid: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Timeouts, transport errors, and 503 (model warming up) are worth
    /// another attempt; everything else is permanent.
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            BackendError::Timeout | BackendError::Transport(_) | BackendError::Status(503)
        )
    }
}

/// Seam to the external text-generation service.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Runs one completion attempt and returns the raw generated text.
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

#[async_trait]
impl<T> GenerativeBackend for Box<T>
where
    T: GenerativeBackend + ?Sized,
{
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        (**self).complete(prompt).await
    }
}

#[async_trait]
impl<T> GenerativeBackend for &T
where
    T: GenerativeBackend + ?Sized,
{
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        (**self).complete(prompt).await
    }
}

/// Hugging Face text-generation backend.
#[derive(Debug, Clone)]
pub struct HfBackend {
    endpoint: String,
    model: String,
    api_token: String,
    max_length: u32,
    temperature: f32,
    do_sample: bool,
    client: Client,
}

impl HfBackend {
    /// Builds a backend from config plus the access token the caller
    /// resolved at startup.
    pub fn new(cfg: &InferenceConfig, api_token: String) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_token,
            max_length: cfg.max_length,
            temperature: cfg.temperature,
            do_sample: cfg.do_sample,
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct HfRequest<'a> {
    inputs: &'a str,
    parameters: HfParameters,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    max_length: u32,
    temperature: f32,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
struct HfGeneration {
    generated_text: String,
}

#[async_trait]
impl GenerativeBackend for HfBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let payload = HfRequest {
            inputs: prompt,
            parameters: HfParameters {
                max_length: self.max_length,
                temperature: self.temperature,
                do_sample: self.do_sample,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/{}",
                self.endpoint.trim_end_matches('/'),
                self.model
            ))
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let generations: Vec<HfGeneration> = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| BackendError::InvalidResponse("empty generation list".to_string()))
    }
}

/// Offline backend used in examples, doctests, and the `mock` CLI backend.
#[derive(Debug, Clone)]
pub struct MockBackend;

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        Ok(format!("{prompt} That sounds great, keep practicing!"))
    }
}

/// Bounded bookkeeping for one attempt sequence, discarded afterwards.
#[derive(Debug)]
struct RetryState {
    attempt: u32,
    max_attempts: u32,
    last_error: Option<BackendError>,
}

impl RetryState {
    fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts: max_attempts.max(1),
            last_error: None,
        }
    }

    /// Records a failed attempt and returns the backoff delay before the
    /// next one (1s, 2s, ...), or `None` once the budget is spent. The
    /// final attempt never waits.
    fn record(&mut self, err: BackendError) -> Option<Duration> {
        let delay = if self.attempt + 1 < self.max_attempts {
            Some(Duration::from_secs(1u64 << self.attempt))
        } else {
            None
        };
        self.attempt += 1;
        self.last_error = Some(err);
        delay
    }
}

/// Calls the generative backend with bounded retries and absorbs every
/// failure into a canned fallback reply.
pub struct InferenceClient<B> {
    backend: B,
    max_attempts: u32,
}

impl<B: GenerativeBackend> InferenceClient<B> {
    pub fn new(backend: B, max_attempts: u32) -> Self {
        Self {
            backend,
            max_attempts,
        }
    }

    /// Generates a tutoring reply for `text`.
    ///
    /// Never fails: transient errors are retried with exponential backoff,
    /// and anything left over becomes a fallback reply for `language`. The
    /// caller cannot tell a generated reply from a fallback one.
    pub async fn generate(&self, text: &str, language: LanguageCode) -> String {
        let prompt = chat_prompt(text);
        let mut retry = RetryState::new(self.max_attempts);
        loop {
            match self.backend.complete(&prompt).await {
                Ok(raw) => {
                    let reply = extract_reply(&raw);
                    if !reply.is_empty() {
                        return reply;
                    }
                    tracing::warn!("backend returned an empty continuation");
                    break;
                }
                Err(err) => {
                    let retryable = err.is_retryable();
                    tracing::warn!(attempt = retry.attempt, error = %err, "inference attempt failed");
                    match retry.record(err) {
                        Some(delay) if retryable => tokio::time::sleep(delay).await,
                        _ => break,
                    }
                }
            }
        }
        if let Some(err) = &retry.last_error {
            tracing::debug!(language = language.code(), last_error = %err, "substituting fallback reply");
        }
        fallback::reply(language)
    }
}

fn chat_prompt(text: &str) -> String {
    format!("User: {text}\nBot:")
}

/// Extracts the continuation after the final `Bot:` marker and trims it.
fn extract_reply(generated: &str) -> String {
    generated
        .rsplit("Bot:")
        .next()
        .unwrap_or(generated)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::replies_for;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedBackend<F> {
        calls: AtomicU32,
        respond: F,
    }

    impl<F> ScriptedBackend<F>
    where
        F: Fn(u32) -> Result<String, BackendError> + Send + Sync,
    {
        fn new(respond: F) -> Self {
            Self {
                calls: AtomicU32::new(0),
                respond,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<F> GenerativeBackend for ScriptedBackend<F>
    where
        F: Fn(u32) -> Result<String, BackendError> + Send + Sync,
    {
        async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
            let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
            (self.respond)(attempt)
        }
    }

    #[test]
    fn backoff_schedule_is_exponential_and_bounded() {
        let mut retry = RetryState::new(3);
        assert_eq!(
            retry.record(BackendError::Status(503)),
            Some(Duration::from_secs(1))
        );
        assert_eq!(
            retry.record(BackendError::Status(503)),
            Some(Duration::from_secs(2))
        );
        assert_eq!(retry.record(BackendError::Timeout), None);
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(BackendError::Timeout.is_retryable());
        assert!(BackendError::Transport("connection refused".to_string()).is_retryable());
        assert!(BackendError::Status(503).is_retryable());
        assert!(!BackendError::Status(400).is_retryable());
        assert!(!BackendError::Status(500).is_retryable());
        assert!(!BackendError::InvalidResponse("not json".to_string()).is_retryable());
    }

    #[test]
    fn reply_extraction_strips_prompt_echo() {
        assert_eq!(
            extract_reply("User: hi\nBot: Hello there! "),
            "Hello there!"
        );
        assert_eq!(extract_reply("no marker at all"), "no marker at all");
        assert_eq!(extract_reply("User: hi\nBot:   "), "");
    }

    #[tokio::test]
    async fn successful_generation_returns_continuation() {
        let backend =
            ScriptedBackend::new(|_| Ok("User: hi\nBot: Nice to meet you!".to_string()));
        let client = InferenceClient::new(&backend, 3);
        let reply = client.generate("hi", LanguageCode::En).await;
        assert_eq!(reply, "Nice to meet you!");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_service_is_retried_three_times_then_falls_back() {
        let backend = ScriptedBackend::new(|_| Err(BackendError::Status(503)));
        let client = InferenceClient::new(&backend, 3);
        let reply = client.generate("hi", LanguageCode::En).await;
        assert_eq!(backend.calls(), 3);
        assert!(replies_for(LanguageCode::En).contains(&reply.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_recovers_on_a_later_attempt() {
        let backend = ScriptedBackend::new(|attempt| {
            if attempt < 2 {
                Err(BackendError::Transport("connection reset".to_string()))
            } else {
                Ok("User: hi\nBot: Back online.".to_string())
            }
        });
        let client = InferenceClient::new(&backend, 3);
        let reply = client.generate("hi", LanguageCode::En).await;
        assert_eq!(reply, "Back online.");
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn malformed_payload_is_not_retried() {
        let backend =
            ScriptedBackend::new(|_| Err(BackendError::InvalidResponse("not json".to_string())));
        let client = InferenceClient::new(&backend, 3);
        let reply = client.generate("hi", LanguageCode::En).await;
        assert_eq!(backend.calls(), 1);
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn empty_continuation_falls_back_without_retry() {
        let backend = ScriptedBackend::new(|_| Ok("User: hi\nBot:".to_string()));
        let client = InferenceClient::new(&backend, 3);
        let reply = client.generate("hi", LanguageCode::Ja).await;
        assert_eq!(backend.calls(), 1);
        assert!(replies_for(LanguageCode::Ja).contains(&reply.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_reply_matches_detected_language() {
        let backend = ScriptedBackend::new(|_| Err(BackendError::Timeout));
        let client = InferenceClient::new(&backend, 3);
        let reply = client.generate("你好", LanguageCode::Zh).await;
        assert!(replies_for(LanguageCode::Zh).contains(&reply.as_str()));
    }
}
