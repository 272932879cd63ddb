use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::TutorError;
use crate::models::Completion;

/// One model attempt's failure: status code when the service produced one,
/// plus a diagnostic message. Recovered by the fallback walk, never
/// surfaced to callers directly.
#[derive(Debug, Clone)]
pub struct AttemptError {
    pub status: Option<u16>,
    pub message: String,
}

impl AttemptError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Seam between the fallback client and the completion service, so tests can
/// substitute a scripted sequence of successes and failures.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Whether a credential is configured. When false the client fails fast
    /// without attempting any model.
    fn credential_present(&self) -> bool {
        true
    }

    async fn request(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<String, AttemptError>;
}

/// Chat-completions request structures
#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// HTTP backend speaking the OpenAI-compatible chat-completions shape.
#[derive(Debug, Clone)]
pub struct HttpCompletionBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HttpCompletionBackend {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    fn credential_present(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn request(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<String, AttemptError> {
        let request_body = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature,
        };

        info!(
            model = %model,
            base_url = %self.base_url,
            prompt_length = prompt.len(),
            "Making completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AttemptError::new(e.status().map(|s| s.as_u16()), e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = extract_service_error(&body).unwrap_or(body);
            return Err(AttemptError::new(Some(status), message));
        }

        let envelope: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::new(None, format!("malformed envelope: {}", e)))?;

        let text = envelope
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AttemptError::new(None, "empty completion text"));
        }

        Ok(text)
    }
}

/// Try to extract a clean error message from the service's error body.
fn extract_service_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorWrapper {
        error: ErrorObject,
    }
    #[derive(Deserialize)]
    struct ErrorObject {
        message: String,
    }
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .map(|w| w.error.message)
}

/// Iterates an ordered model fallback list until one attempt succeeds or all
/// are exhausted. Attempts run sequentially, each bounded by its own timeout;
/// one model's failure never cancels the next attempt.
#[derive(Debug, Clone)]
pub struct FallbackClient<B: CompletionBackend> {
    backend: B,
    models: Vec<String>,
}

impl<B: CompletionBackend> FallbackClient<B> {
    pub fn new(backend: B, models: Vec<String>) -> Self {
        Self { backend, models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Obtain one completion, walking the fallback list in order.
    pub async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Completion, TutorError> {
        if !self.backend.credential_present() {
            return Err(TutorError::MissingCredential);
        }

        crate::log_llm_operation!(start, "complete", model_count = self.models.len());

        let mut attempts = 0;
        let mut last_failure: Option<AttemptError> = None;

        for model in &self.models {
            attempts += 1;
            match self.backend.request(model, prompt, temperature, timeout).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(
                        model = %model,
                        response_length = text.len(),
                        "Completion model attempt succeeded"
                    );
                    return Ok(Completion {
                        text,
                        model_used: model.clone(),
                    });
                }
                Ok(_) => {
                    warn!(model = %model, "Completion model returned empty text, trying next");
                    last_failure = Some(AttemptError::new(None, "empty completion text"));
                }
                Err(e) => {
                    warn!(
                        model = %model,
                        status = ?e.status,
                        error = %e.message,
                        "Completion model attempt failed, trying next"
                    );
                    last_failure = Some(e);
                }
            }
        }

        let (last_status, last_error) = match last_failure {
            Some(failure) => (failure.status, failure.message),
            None => (None, "no completion models configured".to_string()),
        };

        let exhausted = TutorError::AllModelsExhausted {
            attempts,
            last_status,
            last_error,
        };
        crate::log_llm_operation!(error, "complete", error = exhausted);
        Err(exhausted)
    }
}
