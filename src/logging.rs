//! # Structured Logging Module
//!
//! Environment-aware structured logging for the test transaction lifecycle.
//! Console output by default, JSON lines when `TXTEST_LOG_FORMAT=json`.

use crate::constants::system;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let layer = if use_json_format() {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // A global subscriber may already be set by the embedding test runner
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(environment = %environment, "Structured logging initialized");
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var(system::ENV_VARIABLE)
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "test".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn use_json_format() -> bool {
    std::env::var(system::LOG_FORMAT_VARIABLE)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log structured data for transaction boundary operations
pub fn log_transaction_operation(
    operation: &str,
    test: &str,
    manager: Option<&str>,
    rollback: Option<bool>,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        test = %test,
        manager = manager,
        rollback = rollback,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "TRANSACTION_OPERATION"
    );
}

/// Log structured data for hook execution
pub fn log_hook_operation(operation: &str, test: &str, hook: &str) {
    tracing::debug!(
        operation = %operation,
        test = %test,
        hook = %hook,
        "HOOK_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
