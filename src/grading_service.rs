use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::errors::user_facing_message;
use crate::llm_client::{CompletionBackend, FallbackClient};
use crate::models::GradePayload;
use crate::sanitize::ResponseSanitizer;

/// Temperature for grading calls. Kept low so scores are reproducible.
const GRADING_TEMPERATURE: f32 = 0.2;

/// Grades essay submissions against a rubric. Never fails: any upstream or
/// parse failure yields a zero-scored payload with the raw model text (or
/// the user-facing upstream message) folded into `feedback`.
#[derive(Debug, Clone)]
pub struct EssayGradingService<B: CompletionBackend> {
    client: FallbackClient<B>,
    timeout: Duration,
}

impl<B: CompletionBackend> EssayGradingService<B> {
    pub fn new(client: FallbackClient<B>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn grade(&self, question: &str, answer: &str, rubric: &str) -> GradePayload {
        info!(
            question_length = question.len(),
            answer_length = answer.len(),
            "Grading essay submission"
        );

        let prompt = build_grading_prompt(question, answer, rubric);

        let completion = match self
            .client
            .complete(&prompt, GRADING_TEMPERATURE, self.timeout)
            .await
        {
            Ok(completion) => completion,
            Err(e) => {
                error!(error = %e, "Essay grading upstream call failed, substituting zero grade");
                return GradePayload::zeroed(format!(
                    "Automatic grading was unavailable for this submission. {}",
                    user_facing_message(&e)
                ));
            }
        };

        debug!(
            model = %completion.model_used,
            response_content = %completion.text,
            "Raw completion for essay grading"
        );

        match ResponseSanitizer::parse_payload::<GradePayload>(&completion.text) {
            Ok(payload) => {
                info!(
                    model = %completion.model_used,
                    score = payload.score,
                    "Successfully graded essay"
                );
                payload
            }
            Err(e) => {
                warn!(
                    model = %completion.model_used,
                    error = %e,
                    "Grade payload failed strict parse, folding raw text into feedback"
                );
                GradePayload::zeroed(format!(
                    "Automatic grading could not be scored. Raw evaluation: {}",
                    completion.text.trim()
                ))
            }
        }
    }
}

fn build_grading_prompt(question: &str, answer: &str, rubric: &str) -> String {
    format!(
        r#"Grade the following essay answer for an environmental-education platform.

Question:
{question}

Student's Answer:
{answer}

Rubric:
{rubric}

Respond with a JSON object in this exact format, all numeric fields 0-100:
{{
    "score": 0,
    "grammar": 0,
    "clarity": 0,
    "factualAccuracy": 0,
    "strengths": ["specific strength"],
    "improvements": ["specific improvement"],
    "feedback": "Two or three sentences of overall feedback addressed to the student"
}}

Guidelines:
- Score against the rubric, not against exact wording
- Credit partially correct reasoning that shows understanding
- Keep feedback constructive and specific to this answer"#
    )
}
