//! Logging utilities

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Level used when neither `RUST_LOG` nor `MURMUR_LOG_LEVEL` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Initialize the global logging system.
///
/// Filter comes from `RUST_LOG`, then `MURMUR_LOG_LEVEL`, then
/// [`DEFAULT_LOG_LEVEL`]. Logs go to stderr so stdout carries only results.
/// Calling this twice is harmless.
pub fn init_logging() {
    let level =
        std::env::var("MURMUR_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    init_logging_with(&level);
}

/// Initialize logging with an explicit fallback level
pub fn init_logging_with(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
