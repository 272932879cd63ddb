use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::env;
use tracing::{info, warn};

// Import logging macros
use crate::{log_system_event, log_validation};

/// Complete engine configuration loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

/// Completion service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    /// Ordered fallback list, most preferred first. Injected into the
    /// client at construction so tests can substitute their own sequence.
    pub models: Vec<String>,
    pub request_timeout_secs: u64,
    pub temperature: f32,
}

/// Logging system configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub log_directory: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        log_system_event!(config, "Loading engine configuration from environment variables");

        let config = Config {
            llm: LlmConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        };

        log_system_event!(config, "Configuration loaded successfully");
        config.log_configuration_summary();

        Ok(config)
    }

    /// Log a summary of loaded configuration (without sensitive data)
    fn log_configuration_summary(&self) {
        info!(
            api_key_masked = %mask_sensitive_data(&self.llm.api_key),
            base_url = %self.llm.base_url,
            models = ?self.llm.models,
            request_timeout_secs = self.llm.request_timeout_secs,
            log_level = %self.logging.level,
            "Configuration summary"
        );
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.llm.models.is_empty() {
            return Err(anyhow!("LLM_MODELS must list at least one model identifier"));
        }

        if self.llm.request_timeout_secs == 0 {
            return Err(anyhow!("LLM_TIMEOUT_SECS must be greater than 0"));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(anyhow!(
                "LLM_TEMPERATURE must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            ));
        }

        if self.llm.api_key.is_empty() || self.llm.api_key == "your-api-key" {
            warn!("LLM API key appears to be placeholder or empty - AI features will fail fast");
        }

        if !["trace", "debug", "info", "warn", "error"]
            .contains(&self.logging.level.to_lowercase().as_str())
        {
            warn!("Invalid log level '{}', using 'info' as fallback", self.logging.level);
        }

        log_validation!(success, "configuration", "Configuration validation completed successfully");
        Ok(())
    }
}

impl LlmConfig {
    fn from_env() -> Result<Self> {
        let api_key = env::var("LLM_API_KEY").unwrap_or_default();

        let base_url = env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let models = env::var("LLM_MODELS")
            .map(|raw| {
                raw.split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|_| default_model_fallback());

        let timeout_str = env::var("LLM_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
        let request_timeout_secs = timeout_str.parse::<u64>().map_err(|_| {
            anyhow!("Invalid LLM_TIMEOUT_SECS value: '{}'. Must be a number of seconds", timeout_str)
        })?;

        let temperature_str = env::var("LLM_TEMPERATURE").unwrap_or_else(|_| "0.7".to_string());
        let temperature = temperature_str.parse::<f32>().map_err(|_| {
            anyhow!("Invalid LLM_TEMPERATURE value: '{}'. Must be a number", temperature_str)
        })?;

        Ok(LlmConfig {
            api_key,
            base_url,
            models,
            request_timeout_secs,
            temperature,
        })
    }
}

impl LoggingConfig {
    fn from_env() -> Result<Self> {
        let level = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info,ecolearn_tutor=debug".to_string());

        let file_enabled = env::var("LOG_FILE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let console_enabled = env::var("LOG_CONSOLE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let log_directory = env::var("LOG_DIRECTORY").unwrap_or_else(|_| "logs".to_string());

        Ok(LoggingConfig {
            level,
            file_enabled,
            console_enabled,
            log_directory,
        })
    }
}

/// Ordered default fallback list, cheapest capable model first.
fn default_model_fallback() -> Vec<String> {
    vec![
        "gpt-4o-mini".to_string(),
        "gpt-4o".to_string(),
        "gpt-3.5-turbo".to_string(),
    ]
}

/// Mask sensitive data in configuration for safe logging
fn mask_sensitive_data(data: &str) -> String {
    if data.len() <= 8 {
        "*".repeat(data.len())
    } else {
        format!("{}***{}", &data[..4], &data[data.len() - 4..])
    }
}
