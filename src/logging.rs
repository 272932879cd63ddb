// Macros file - tracing macros are imported within the macro definitions

/// Standardized logging macros for consistent field names and message
/// patterns across the engine.

// ============================================================================
// LLM Operation Logging Macros
// ============================================================================

/// Log completion pipeline operations with model context
#[macro_export]
macro_rules! log_llm_operation {
    (start, $operation:expr, model_count = $count:expr) => {
        tracing::info!(
            component = "llm_client",
            operation = $operation,
            model_count = $count,
            "LLM operation started"
        );
    };
    (success, $operation:expr, model = $model:expr, response_length = $len:expr) => {
        tracing::info!(
            component = "llm_client",
            operation = $operation,
            model = %$model,
            response_length = $len,
            "LLM operation completed successfully"
        );
    };
    (error, $operation:expr, error = $error:expr) => {
        tracing::error!(
            component = "llm_client",
            operation = $operation,
            error = %$error,
            "LLM operation failed"
        );
    };
    (warn, $operation:expr, $msg:expr) => {
        tracing::warn!(
            component = "llm_client",
            operation = $operation,
            "LLM operation warning: {}", $msg
        );
    };
}

// ============================================================================
// System Event Logging Macros
// ============================================================================

/// Log system startup and configuration events
#[macro_export]
macro_rules! log_system_event {
    (startup, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "startup",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (config, $msg:expr) => {
        tracing::info!(event_type = "configuration", "System event: {}", $msg);
    };
}

// ============================================================================
// Validation Logging Macros
// ============================================================================

/// Log validation results consistently
#[macro_export]
macro_rules! log_validation {
    (success, $component:expr, $msg:expr) => {
        tracing::debug!(
            event_type = "validation",
            component = $component,
            result = "success",
            "Validation completed: {}", $msg
        );
    };
    (failure, $component:expr, error = $error:expr) => {
        tracing::warn!(
            event_type = "validation",
            component = $component,
            result = "failure",
            error = %$error,
            "Validation failed"
        );
    };
}
