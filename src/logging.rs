//! Logging configuration for sql-tracer.
//!
//! Logs go to stderr so they never mix with `--display` output on stdout.

use tracing_subscriber::EnvFilter;

/// Level used when neither `--log-level`, the config file nor `RUST_LOG`
/// sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Builds the filter: an explicit level wins over `RUST_LOG`.
pub fn build_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
    }
}

/// Initializes stderr logging.
pub fn init_stderr_logging(level: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr)
        .init();
}
