//! Logging configuration
//!
//! Initializes tracing for the application.

use tracing_subscriber::{EnvFilter, fmt};

/// Builds the filter: `RUST_LOG` wins over the configured level
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initializes logging with the specified level
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(level: &str) {
    let _ = fmt()
        .with_env_filter(filter(level))
        .with_target(false)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .try_init();
}
