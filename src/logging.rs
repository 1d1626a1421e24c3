//! Logging setup
//!
//! The library only emits `tracing` events; the binary installs the subscriber.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with a specific level
///
/// `RUST_LOG` takes precedence over `level` when set.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize logging for tests
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
