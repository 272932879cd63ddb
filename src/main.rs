use anyhow::{Context, Result, bail};
use std::env;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ecolearn_tutor::{
    Config, EssayGradingService, FallbackClient, HttpCompletionBackend, LeakGuard, QuizGenerator,
    SubjectPerformance, TutorService, log_system_event, user_facing_message,
};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct EssaySubmission {
    question: String,
    answer: String,
    rubric: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let _guard = setup_logging()?;
    log_system_event!(startup, component = "cli", "EcoLearn tutor engine starting");

    let config = Config::from_env()?;
    config.validate()?;

    let backend = HttpCompletionBackend::new(config.llm.api_key.clone(), config.llm.base_url.clone());
    let client = FallbackClient::new(backend, config.llm.models.clone());
    let timeout = Duration::from_secs(config.llm.request_timeout_secs);

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("quiz") => {
            let path = args
                .get(1)
                .context("usage: ecolearn-tutor quiz <subjects.json>")?;
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading subject history from {}", path))?;
            let subjects: Vec<SubjectPerformance> =
                serde_json::from_str(&raw).context("parsing subject history JSON")?;

            let generator = QuizGenerator::new(client, config.llm.temperature, timeout);
            let quiz = generator.generate(&subjects).await;
            match quiz {
                Ok(quiz) => {
                    info!(quiz_id = %quiz.quiz_id, questions = quiz.question_count(), "Quiz generated");
                    serde_json::to_string_pretty(&quiz)?
                }
                Err(e) => bail!("{}", user_facing_message(&e)),
            }
        }
        Some("grade") => {
            let path = args
                .get(1)
                .context("usage: ecolearn-tutor grade <essay.json>")?;
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading essay submission from {}", path))?;
            let submission: EssaySubmission =
                serde_json::from_str(&raw).context("parsing essay submission JSON")?;

            let service = EssayGradingService::new(client, timeout);
            let grade = service
                .grade(&submission.question, &submission.answer, &submission.rubric)
                .await;
            serde_json::to_string_pretty(&grade)?
        }
        Some("tutor") => {
            let question = args
                .get(1)
                .context("usage: ecolearn-tutor tutor <question> [context]")?;
            let quiz_context = args.get(2).map(String::as_str);

            let service = TutorService::new(
                client,
                LeakGuard::new()?,
                config.llm.temperature,
                timeout,
            );
            match service.respond(question, quiz_context).await {
                Ok(text) => text,
                Err(e) => bail!("{}", user_facing_message(&e)),
            }
        }
        _ => bail!(
            "usage: ecolearn-tutor <quiz subjects.json | grade essay.json | tutor question [context]>"
        ),
    };

    println!("{}", result);
    Ok(())
}

fn setup_logging() -> Result<WorkerGuard> {
    use std::fs;
    use tracing_subscriber::fmt;

    // Create logs directory if it doesn't exist
    fs::create_dir_all("logs").unwrap_or_else(|e| {
        eprintln!("Warning: Could not create logs directory: {}", e);
    });

    let default_log_level = "info,ecolearn_tutor=debug";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_level));

    // Daily-rotated file output alongside console output
    let file_appender = tracing_appender::rolling::daily("logs", "ecolearn-tutor.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(true);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(non_blocking_file);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized - writing to logs/ecolearn-tutor.log with daily rotation");

    Ok(guard)
}
