//! Tracing for tests
//!
//! Call [`init_test_tracing`] at the top of a test to see engine spans and
//! events in the test output; `RUST_LOG` controls the filter.

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Another harness may already own the global subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Installs a test-writer subscriber once per process
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}
