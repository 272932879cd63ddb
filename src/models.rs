use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One subject's mark history as stored by the platform's exam records.
///
/// `marks_obtained` may exceed `total_marks` if the caller hands us bad
/// records; the planner treats that as a zero gap rather than validating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPerformance {
    pub subject: String,
    pub marks_obtained: f64,
    pub total_marks: f64,
}

/// Derived per-subject allocation. `count` is at least 1 for every subject
/// that appears in the input, and counts sum to the quiz total by
/// construction (see `planner` for the one documented exception).
#[derive(Debug, Clone, Serialize)]
pub struct SubjectWeight {
    pub subject: String,
    pub weight: f64,
    pub count: usize,
    pub marks: f64,
    pub total: f64,
}

/// Successful completion attempt: the raw text plus which model produced it.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model_used: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub subject: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizPayload {
    pub questions: Vec<QuizQuestion>,
}

/// Either the strict-parsed quiz or the sanitized raw text when the model's
/// JSON could not be parsed. Degraded mode is returned to the caller rather
/// than aborting the flow.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QuizContent {
    Structured(QuizPayload),
    Degraded { raw: String },
}

/// Envelope the platform persists and serves downstream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuiz {
    pub quiz_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub model_used: Option<String>,
    pub content: QuizContent,
}

impl GeneratedQuiz {
    pub fn question_count(&self) -> usize {
        match &self.content {
            QuizContent::Structured(payload) => payload.questions.len(),
            QuizContent::Degraded { .. } => 0,
        }
    }
}

/// Essay grade as the grading model reports it. Numeric fields are 0-100 by
/// contract with the prompt; they are not clamped here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePayload {
    pub score: f64,
    pub grammar: f64,
    pub clarity: f64,
    pub factual_accuracy: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub feedback: String,
}

impl GradePayload {
    /// Zero-scored grade substituted when generation or parsing fails.
    pub fn zeroed(feedback: String) -> Self {
        Self {
            score: 0.0,
            grammar: 0.0,
            clarity: 0.0,
            factual_accuracy: 0.0,
            strengths: Vec::new(),
            improvements: Vec::new(),
            feedback,
        }
    }
}
