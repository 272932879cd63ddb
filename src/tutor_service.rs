use std::time::Duration;
use tracing::{debug, info};

use crate::errors::TutorError;
use crate::leak_guard::LeakGuard;
use crate::llm_client::{CompletionBackend, FallbackClient};

/// Tutoring-help path: answers a student's question about the current quiz
/// topic, with every response passed through the answer-leak guard before it
/// reaches the student.
#[derive(Debug, Clone)]
pub struct TutorService<B: CompletionBackend> {
    client: FallbackClient<B>,
    guard: LeakGuard,
    temperature: f32,
    timeout: Duration,
}

impl<B: CompletionBackend> TutorService<B> {
    pub fn new(
        client: FallbackClient<B>,
        guard: LeakGuard,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            guard,
            temperature,
            timeout,
        }
    }

    pub async fn respond(
        &self,
        question: &str,
        quiz_context: Option<&str>,
    ) -> Result<String, TutorError> {
        info!(
            question_length = question.len(),
            has_context = quiz_context.is_some(),
            "Answering tutoring question"
        );

        let prompt = build_tutoring_prompt(question, quiz_context);
        let completion = self.client.complete(&prompt, self.temperature, self.timeout).await?;

        debug!(
            model = %completion.model_used,
            response_content = %completion.text,
            "Raw completion for tutoring question"
        );

        let safe = self
            .guard
            .guard(&completion.text, &self.client, self.temperature, self.timeout)
            .await;

        Ok(safe)
    }
}

fn build_tutoring_prompt(question: &str, quiz_context: Option<&str>) -> String {
    let context_block = match quiz_context {
        Some(context) => format!("\n\nCurrent quiz context:\n{}", context),
        None => String::new(),
    };

    format!(
        r#"You are a tutor on an environmental-education platform. A student is working
through a quiz and has asked for help. Guide them toward the concept with hints
and questions; never state a quiz answer or an option letter.

Student's question:
{question}{context_block}"#
    )
}
