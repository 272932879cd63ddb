use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::TutorError;
use crate::llm_client::{CompletionBackend, FallbackClient};
use crate::models::{GeneratedQuiz, QuizContent, QuizPayload, SubjectPerformance};
use crate::planner;
use crate::sanitize::ResponseSanitizer;

/// Composes the planner's distribution into a generation prompt, obtains a
/// completion through the fallback client, and parses the structured quiz
/// payload with degraded-mode retention on parse failure.
#[derive(Debug, Clone)]
pub struct QuizGenerator<B: CompletionBackend> {
    client: FallbackClient<B>,
    temperature: f32,
    timeout: Duration,
}

impl<B: CompletionBackend> QuizGenerator<B> {
    pub fn new(client: FallbackClient<B>, temperature: f32, timeout: Duration) -> Self {
        Self {
            client,
            temperature,
            timeout,
        }
    }

    pub async fn generate(
        &self,
        subjects: &[SubjectPerformance],
    ) -> Result<GeneratedQuiz, TutorError> {
        let distribution = planner::plan(subjects);

        if distribution.is_empty() {
            info!("No subject history supplied, returning empty quiz without a model call");
            return Ok(GeneratedQuiz {
                quiz_id: Uuid::new_v4(),
                generated_at: Utc::now(),
                model_used: None,
                content: QuizContent::Structured(QuizPayload { questions: Vec::new() }),
            });
        }

        let total: usize = distribution.iter().map(|w| w.count).sum();
        let prompt = build_generation_prompt(total, &planner::render_distribution(&distribution));

        info!(
            subject_count = distribution.len(),
            total_questions = total,
            "Generating adaptive quiz"
        );

        let completion = self.client.complete(&prompt, self.temperature, self.timeout).await?;

        debug!(
            model = %completion.model_used,
            response_content = %completion.text,
            "Raw completion for quiz generation"
        );

        let content = match ResponseSanitizer::parse_payload::<QuizPayload>(&completion.text) {
            Ok(payload) => {
                info!(
                    model = %completion.model_used,
                    question_count = payload.questions.len(),
                    "Successfully parsed generated quiz"
                );
                QuizContent::Structured(payload)
            }
            Err(e) => {
                warn!(
                    model = %completion.model_used,
                    error = %e,
                    "Quiz payload failed strict parse, retaining sanitized raw text"
                );
                let raw = ResponseSanitizer::extract_json(&completion.text)
                    .unwrap_or_else(|| completion.text.trim().to_string());
                QuizContent::Degraded { raw }
            }
        };

        Ok(GeneratedQuiz {
            quiz_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            model_used: Some(completion.model_used),
            content,
        })
    }
}

/// Fixed generation prompt. States explicitly that the quiz is triggered by
/// the learning system itself; there is no student-authored input here.
fn build_generation_prompt(total_questions: usize, distribution_block: &str) -> String {
    format!(
        r#"You are the quiz generator for an environmental-education platform. This quiz
is triggered automatically by the learning system when a student finishes a lesson;
none of the text below was authored by the student.

Generate exactly {total_questions} multiple-choice questions, distributed across subjects as
follows (weighted toward the student's weaker subjects):
{distribution_block}

Respond with a JSON object in this exact format:
{{
    "questions": [
        {{
            "subject": "Subject name from the distribution above",
            "question": "Question text here",
            "options": ["Option text 1", "Option text 2", "Option text 3", "Option text 4"],
            "correctAnswer": "The full text of the correct option",
            "explanation": "One-sentence explanation of the correct answer"
        }}
    ]
}}

Guidelines:
- Provide exactly 4 option texts WITHOUT letter prefixes (A., B., etc.)
- Match the per-subject question counts from the distribution exactly
- Keep questions grounded in environmental science curricula
- Make questions challenging but fair"#
    )
}
