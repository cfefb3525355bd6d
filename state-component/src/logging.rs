//! Logging setup for applications built on state components
//!
//! The library only emits `tracing` events. Binaries call one of these
//! functions once at startup to install a `tracing-subscriber` that prints
//! them.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Output style for component logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// Install nothing; events are dropped
    Silent,
    /// Compact stderr output, `info` by default
    Development,
    /// Pretty output with thread ids and source locations, `debug` by default
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Install a subscriber for the given mode
///
/// # Environment Variables
///
/// - `STATE_COMPONENT_LOG_LEVEL`: filter directive (e.g. `state_component=trace`)
/// - `RUST_LOG`: used when the variable above is unset
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let subscriber = Registry::default()
                .with(fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact())
                .with(create_env_filter("info"));

            subscriber.try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(fmt::layer()
                    .pretty()
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true))
                .with(create_env_filter("debug"));

            subscriber.try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Install a subscriber chosen by `STATE_COMPONENT_LOG_MODE`
///
/// - "development" -> `LoggingMode::Development`
/// - "debug" -> `LoggingMode::Debug`
/// - anything else -> `LoggingMode::Silent`
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    init_logging(mode_from_env_value(
        std::env::var("STATE_COMPONENT_LOG_MODE").ok().as_deref(),
    ))
}

fn mode_from_env_value(value: Option<&str>) -> LoggingMode {
    match value {
        Some("development") => LoggingMode::Development,
        Some("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    }
}

fn create_env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("STATE_COMPONENT_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}

/// Whether a global subscriber is already installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[test]
    fn test_mode_from_env_value() {
        assert_eq!(mode_from_env_value(Some("development")), LoggingMode::Development);
        assert_eq!(mode_from_env_value(Some("debug")), LoggingMode::Debug);
        assert_eq!(mode_from_env_value(Some("verbose")), LoggingMode::Silent);
        assert_eq!(mode_from_env_value(None), LoggingMode::Silent);
    }
}
