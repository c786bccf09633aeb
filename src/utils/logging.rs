//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the HackConf services.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{HackConfError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer when dropped, so the caller
/// must keep it alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| HackConfError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| HackConfError::Config(format!("Failed to install log subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log check-in attempts with structured data
pub fn log_check_in(event_id: i64, user_id: i64, checked_in: bool) {
    if checked_in {
        info!(
            event_id = event_id,
            user_id = user_id,
            "User checked into event"
        );
    } else {
        info!(
            event_id = event_id,
            user_id = user_id,
            "User had already checked into event"
        );
    }
}

/// Log user removal together with what the cascade took with it
pub fn log_user_deletion(user_id: i64, tokens: usize, talks: usize, check_ins: usize) {
    warn!(
        user_id = user_id,
        tokens = tokens,
        talks = talks,
        check_ins = check_ins,
        "User deleted"
    );
}

/// Log how a transaction was closed
pub fn log_transaction_closed(operation: &str, committed: bool) {
    if committed {
        debug!(operation = operation, "Transaction committed");
    } else {
        debug!(operation = operation, "Transaction rolled back");
    }
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
