//! Logging initialization for the inspector.
//!
//! Logs go to stderr so the report on stdout stays machine-readable.

use tracing_subscriber::prelude::*;

/// Initialize logging with sensible defaults.
///
/// If RUST_LOG is not set, debug builds default to DEBUG and release builds to INFO.
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    if std::env::var("RUST_LOG").is_err() {
        // Safety: single-threaded at startup
        unsafe {
            if cfg!(debug_assertions) {
                std::env::set_var("RUST_LOG", "debug");
            } else {
                std::env::set_var("RUST_LOG", "info");
            }
        }
    }

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!("Logging initialized");
}
