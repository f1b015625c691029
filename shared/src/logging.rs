//! Shared logging utilities for consistent tracing across server and clients

use crate::types::ProcessRole;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Build the per-role filter directive string
pub fn filter_directives(role: &ProcessRole, log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");

    match role {
        ProcessRole::Server => {
            format!("webserver={base_level},shared={base_level},tower_http=info,axum={base_level},redb=warn")
        }
        ProcessRole::Client => {
            format!("client={base_level},shared={base_level},tungstenite=warn")
        }
    }
}

/// Initialize tracing subscriber with the given level for the current role
///
/// `RUST_LOG`, when set, takes precedence over the role defaults.
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let role = ProcessRole::current();
    let directives = filter_directives(role, log_level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    // A second init (tests, embedding) is not an error
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for process-aware info logging
#[macro_export]
macro_rules! process_info {
    ($role:expr, $($arg:tt)*) => {
        tracing::info!(
            process = %$role,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware warning logging
#[macro_export]
macro_rules! process_warn {
    ($role:expr, $($arg:tt)*) => {
        tracing::warn!(
            process = %$role,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware error logging
#[macro_export]
macro_rules! process_error {
    ($role:expr, $($arg:tt)*) => {
        tracing::error!(
            process = %$role,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware debug logging
#[macro_export]
macro_rules! process_debug {
    ($role:expr, $($arg:tt)*) => {
        tracing::debug!(
            process = %$role,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(role: &ProcessRole, details: &str) {
    info!(
        process = %role,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(role: &ProcessRole, reason: &str) {
    info!(
        process = %role,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(role: &ProcessRole, context: &str, error: &dyn std::fmt::Display) {
    error!(
        process = %role,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(role: &ProcessRole, message: &str) {
    info!(
        process = %role,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}
