//! Tracing setup shared by the binary and tests.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter, e.g. `synergist=debug`.
pub const LOG_ENV: &str = "SYNERGIST_LOG";

const DEFAULT_FILTER: &str = "synergist=info";

/// Log to stderr so stdout stays machine readable. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
