use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ecolearn_tutor::{
    AttemptError, CompletionBackend, EssayGradingService, FallbackClient, QuizContent,
    QuizGenerator, SubjectPerformance, TutorError,
};

/// Backend that replays a scripted sequence of per-model outcomes and
/// records which models were attempted, in order.
#[derive(Clone)]
struct ScriptedBackend {
    responses: Arc<Mutex<VecDeque<Result<String, AttemptError>>>>,
    models_tried: Arc<Mutex<Vec<String>>>,
    credential: bool,
}

impl ScriptedBackend {
    fn new(responses: Vec<Result<String, AttemptError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            models_tried: Arc::new(Mutex::new(Vec::new())),
            credential: true,
        }
    }

    fn without_credential() -> Self {
        let mut backend = Self::new(Vec::new());
        backend.credential = false;
        backend
    }

    fn models_tried(&self) -> Vec<String> {
        self.models_tried.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn credential_present(&self) -> bool {
        self.credential
    }

    async fn request(
        &self,
        model: &str,
        _prompt: &str,
        _temperature: f32,
        _timeout: Duration,
    ) -> Result<String, AttemptError> {
        self.models_tried.lock().unwrap().push(model.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AttemptError::new(None, "script exhausted")))
    }
}

fn models(names: &[&str]) -> Vec<String> {
    names.iter().map(|m| m.to_string()).collect()
}

fn subjects() -> Vec<SubjectPerformance> {
    vec![
        SubjectPerformance {
            subject: "Math".to_string(),
            marks_obtained: 40.0,
            total_marks: 100.0,
        },
        SubjectPerformance {
            subject: "Bio".to_string(),
            marks_obtained: 90.0,
            total_marks: 100.0,
        },
    ]
}

const VALID_QUIZ_JSON: &str = r#"```json
{
    "questions": [
        {
            "subject": "Math",
            "question": "What fraction of household waste is compostable?",
            "options": ["About a third", "None", "All of it", "Exactly half"],
            "correctAnswer": "About a third",
            "explanation": "Organic waste makes up roughly a third of household waste."
        }
    ]
}
```"#;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_fallback_tries_models_in_order_until_success() {
    let backend = ScriptedBackend::new(vec![
        Err(AttemptError::new(Some(500), "server error")),
        Err(AttemptError::new(Some(429), "rate limited")),
        Ok(VALID_QUIZ_JSON.to_string()),
    ]);
    let client = FallbackClient::new(backend.clone(), models(&["m1", "m2", "m3"]));

    let completion = client.complete("prompt", 0.7, TIMEOUT).await.unwrap();

    assert_eq!(completion.model_used, "m3");
    assert_eq!(backend.models_tried(), vec!["m1", "m2", "m3"]);
}

#[tokio::test]
async fn test_first_success_stops_the_walk() {
    let backend = ScriptedBackend::new(vec![Ok("hello".to_string())]);
    let client = FallbackClient::new(backend.clone(), models(&["m1", "m2"]));

    let completion = client.complete("prompt", 0.7, TIMEOUT).await.unwrap();

    assert_eq!(completion.model_used, "m1");
    assert_eq!(backend.models_tried(), vec!["m1"]);
}

#[tokio::test]
async fn test_empty_completion_text_falls_through() {
    let backend = ScriptedBackend::new(vec![Ok("   ".to_string()), Ok("real text".to_string())]);
    let client = FallbackClient::new(backend.clone(), models(&["m1", "m2"]));

    let completion = client.complete("prompt", 0.7, TIMEOUT).await.unwrap();

    assert_eq!(completion.model_used, "m2");
    assert_eq!(completion.text, "real text");
}

#[tokio::test]
async fn test_exhaustion_reports_attempts_and_last_status() {
    let backend = ScriptedBackend::new(vec![
        Err(AttemptError::new(Some(500), "server error")),
        Err(AttemptError::new(Some(401), "bad key")),
    ]);
    let client = FallbackClient::new(backend, models(&["m1", "m2"]));

    let error = client.complete("prompt", 0.7, TIMEOUT).await.unwrap_err();

    match error {
        TutorError::AllModelsExhausted {
            attempts,
            last_status,
            last_error,
        } => {
            assert_eq!(attempts, 2);
            assert_eq!(last_status, Some(401));
            assert_eq!(last_error, "bad key");
        }
        other => panic!("expected AllModelsExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_credential_fails_fast_without_attempts() {
    let backend = ScriptedBackend::without_credential();
    let client = FallbackClient::new(backend.clone(), models(&["m1", "m2"]));

    let error = client.complete("prompt", 0.7, TIMEOUT).await.unwrap_err();

    assert!(matches!(error, TutorError::MissingCredential));
    assert!(backend.models_tried().is_empty());
}

#[tokio::test]
async fn test_generated_quiz_parses_structured_payload() {
    let backend = ScriptedBackend::new(vec![Ok(VALID_QUIZ_JSON.to_string())]);
    let generator = QuizGenerator::new(FallbackClient::new(backend, models(&["m1"])), 0.7, TIMEOUT);

    let quiz = generator.generate(&subjects()).await.unwrap();

    assert_eq!(quiz.model_used.as_deref(), Some("m1"));
    match quiz.content {
        QuizContent::Structured(payload) => {
            assert_eq!(payload.questions.len(), 1);
            assert_eq!(payload.questions[0].subject, "Math");
            assert_eq!(payload.questions[0].options.len(), 4);
            assert_eq!(payload.questions[0].correct_answer, "About a third");
        }
        QuizContent::Degraded { raw } => panic!("expected structured quiz, got degraded: {}", raw),
    }
}

#[tokio::test]
async fn test_unparseable_quiz_payload_degrades_to_raw() {
    let broken = "Here is your quiz: {\"questions\": [oops}";
    let backend = ScriptedBackend::new(vec![Ok(broken.to_string())]);
    let generator = QuizGenerator::new(FallbackClient::new(backend, models(&["m1"])), 0.7, TIMEOUT);

    let quiz = generator.generate(&subjects()).await.unwrap();

    let question_count = quiz.question_count();
    match quiz.content {
        QuizContent::Degraded { raw } => {
            assert_eq!(raw, "{\"questions\": [oops}");
        }
        QuizContent::Structured(_) => panic!("expected degraded payload"),
    }
    assert_eq!(question_count, 0);
}

#[tokio::test]
async fn test_quiz_generation_surfaces_model_exhaustion() {
    let backend = ScriptedBackend::new(vec![Err(AttemptError::new(Some(503), "down"))]);
    let generator = QuizGenerator::new(FallbackClient::new(backend, models(&["m1"])), 0.7, TIMEOUT);

    let error = generator.generate(&subjects()).await.unwrap_err();
    assert!(matches!(error, TutorError::AllModelsExhausted { .. }));
}

#[tokio::test]
async fn test_empty_subject_history_skips_model_call() {
    let backend = ScriptedBackend::new(Vec::new());
    let generator = QuizGenerator::new(
        FallbackClient::new(backend.clone(), models(&["m1"])),
        0.7,
        TIMEOUT,
    );

    let quiz = generator.generate(&[]).await.unwrap();

    assert!(quiz.model_used.is_none());
    assert_eq!(quiz.question_count(), 0);
    assert!(backend.models_tried().is_empty());
}

#[tokio::test]
async fn test_grading_parses_strict_schema() {
    let grade_json = r#"```json
{
    "score": 82,
    "grammar": 90,
    "clarity": 78,
    "factualAccuracy": 85,
    "strengths": ["Clear definition of composting"],
    "improvements": ["Mention nutrient cycling"],
    "feedback": "A solid answer that covers the core process."
}
```"#;
    let backend = ScriptedBackend::new(vec![Ok(grade_json.to_string())]);
    let service = EssayGradingService::new(FallbackClient::new(backend, models(&["m1"])), TIMEOUT);

    let grade = service
        .grade("Explain composting.", "It breaks down waste.", "Rubric text")
        .await;

    assert_eq!(grade.score, 82.0);
    assert_eq!(grade.factual_accuracy, 85.0);
    assert_eq!(grade.strengths.len(), 1);
    assert_eq!(grade.feedback, "A solid answer that covers the core process.");
}

#[tokio::test]
async fn test_grading_missing_key_folds_raw_text_into_feedback() {
    // No "feedback" key: strict schema must reject and zero the grade.
    let incomplete = r#"{"score": 70, "grammar": 80, "clarity": 75, "factualAccuracy": 60, "strengths": [], "improvements": []}"#;
    let backend = ScriptedBackend::new(vec![Ok(incomplete.to_string())]);
    let service = EssayGradingService::new(FallbackClient::new(backend, models(&["m1"])), TIMEOUT);

    let grade = service.grade("Q", "A", "R").await;

    assert_eq!(grade.score, 0.0);
    assert!(grade.feedback.contains(incomplete));
}

#[tokio::test]
async fn test_grading_upstream_failure_returns_zeroed_payload() {
    let backend = ScriptedBackend::new(vec![Err(AttemptError::new(Some(429), "rate limited"))]);
    let service = EssayGradingService::new(FallbackClient::new(backend, models(&["m1"])), TIMEOUT);

    let grade = service.grade("Q", "A", "R").await;

    assert_eq!(grade.score, 0.0);
    assert_eq!(grade.grammar, 0.0);
    assert!(grade.improvements.is_empty());
    assert!(grade.feedback.contains("unavailable"));
}
