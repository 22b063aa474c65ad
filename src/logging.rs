//! # Structured Logging Module
//!
//! Environment-aware structured logging for long-running migration jobs.
//! Every helper carries the run id so the lines of one run can be correlated.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json = std::env::var("W2P_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

        let layer = if json {
            fmt::layer().with_target(true).json().with_filter(filter).boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        // An embedding host may already own the global subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(environment = %environment, json, "Structured logging initialized");
    });
}

fn get_environment() -> String {
    std::env::var("W2P_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log a stage transition of the orchestrator
pub fn log_stage_operation(run_id: Uuid, stage: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        run_id = %run_id,
        stage = %stage,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "STAGE_OPERATION"
    );
}

/// Log one processed page
pub fn log_page_operation(
    run_id: Uuid,
    processor: &str,
    step: u32,
    percentage: u8,
    rows: usize,
) {
    tracing::debug!(
        run_id = %run_id,
        processor = %processor,
        step = step,
        percentage = percentage,
        rows = rows,
        timestamp = %Utc::now().to_rfc3339(),
        "PAGE_OPERATION"
    );
}

/// Log an error with context
pub fn log_error(run_id: Option<Uuid>, component: &str, operation: &str, error: &str) {
    tracing::error!(
        run_id = run_id.map(|id| id.to_string()),
        component = %component,
        operation = %operation,
        error = %error,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_per_environment() {
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("staging"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging();
        init_structured_logging();
        log_stage_operation(Uuid::new_v4(), "languages", "started", None);
    }
}
