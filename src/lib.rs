pub mod config;
pub mod errors;
pub mod grading_service;
pub mod leak_guard;
pub mod llm_client;
pub mod logging;
pub mod models;
pub mod planner;
pub mod quiz_service;
pub mod sanitize;
pub mod tutor_service;

pub use config::Config;
pub use errors::{TutorError, user_facing_message};
pub use grading_service::EssayGradingService;
pub use leak_guard::{DEFLECTION, LeakGuard};
pub use llm_client::{AttemptError, CompletionBackend, FallbackClient, HttpCompletionBackend};
pub use models::*;
pub use quiz_service::QuizGenerator;
pub use sanitize::ResponseSanitizer;
pub use tutor_service::TutorService;
