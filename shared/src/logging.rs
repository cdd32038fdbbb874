//! Shared logging utilities for consistent tracing across binaries

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::types::SessionId;

/// Which binary is initializing tracing; selects the per-crate filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    WebServer,
    Designer,
}

/// Build the `EnvFilter` directive string for a component and base level
pub fn filter_directives(component: Component, log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");

    match component {
        Component::WebServer => {
            format!("webserver={base_level},designer={base_level},shared={base_level},tower_http=debug,axum={base_level},reqwest=warn")
        }
        Component::Designer => {
            format!("designer={base_level},shared={base_level},reqwest=warn")
        }
    }
}

/// Initialize the stdout tracing subscriber. `RUST_LOG` overrides the level.
pub fn init_tracing(component: Component, log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(component, log_level)));

    // try_init so tests and repeated calls do not panic
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

/// Macro for session-aware info logging
#[macro_export]
macro_rules! session_info {
    ($session_id:expr, $($arg:tt)*) => {
        tracing::info!(
            session = %$session_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for session-aware warning logging
#[macro_export]
macro_rules! session_warn {
    ($session_id:expr, $($arg:tt)*) => {
        tracing::warn!(
            session = %$session_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for session-aware error logging
#[macro_export]
macro_rules! session_error {
    ($session_id:expr, $($arg:tt)*) => {
        tracing::error!(
            session = %$session_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for session-aware debug logging
#[macro_export]
macro_rules! session_debug {
    ($session_id:expr, $($arg:tt)*) => {
        tracing::debug!(
            session = %$session_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(details: &str) {
    info!(timestamp = format_timestamp(), "🚀 Starting {}", details);
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(reason: &str) {
    info!(timestamp = format_timestamp(), "🛑 Shutting down: {}", reason);
}

/// Contextual logging helper for error conditions
pub fn log_error(session_id: Option<&SessionId>, context: &str, error: &dyn std::fmt::Display) {
    match session_id {
        Some(id) => error!(
            session = %id,
            timestamp = format_timestamp(),
            error = %error,
            "❌ {} failed: {}",
            context,
            error
        ),
        None => error!(
            timestamp = format_timestamp(),
            error = %error,
            "❌ {} failed: {}",
            context,
            error
        ),
    }
}
