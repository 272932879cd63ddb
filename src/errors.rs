/// Centralized error types for the quiz and tutoring pipeline.
///
/// Per-model attempt failures are not part of this taxonomy: they are logged
/// and recovered by the fallback walk in `llm_client`. Malformed payloads are
/// usually recovered locally by the services (degraded quiz, zeroed grade)
/// and only surface to callers that opt into strict parsing.
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    #[error("no completion API credential is configured")]
    MissingCredential,

    #[error("all {attempts} completion models failed; last error: {last_error}")]
    AllModelsExhausted {
        attempts: usize,
        last_status: Option<u16>,
        last_error: String,
    },

    #[error("malformed completion payload: {0}")]
    MalformedPayload(String),
}

/// Map a pipeline error to the message the HTTP layer shows users.
///
/// Status classes are distinguished so credential problems, rate limiting,
/// and unknown-model errors read differently from generic outages.
pub fn user_facing_message(error: &TutorError) -> String {
    match error {
        TutorError::MissingCredential => {
            "AI features are not configured on this server. Contact your administrator.".to_string()
        }
        TutorError::AllModelsExhausted { last_status, .. } => match last_status {
            Some(401) | Some(403) => {
                "The AI service rejected this server's credentials. Contact your administrator."
                    .to_string()
            }
            Some(429) => {
                "The AI service is rate limiting requests. Please try again in a moment."
                    .to_string()
            }
            Some(404) => {
                "The configured AI models are unavailable. Contact your administrator.".to_string()
            }
            _ => "AI service temporarily unavailable. Please try again.".to_string(),
        },
        TutorError::MalformedPayload(_) => {
            "The AI service returned an unreadable response. Please try again.".to_string()
        }
    }
}
