//! Diagnostics subscriber setup.
//!
//! Diagnostics go to stderr so stdout carries only results.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directive
pub const LOG_ENV_VAR: &str = "LOGBENCH_LOG";

const DEFAULT_FILTER: &str = "logbench=info";

/// Install the global stderr subscriber. Safe to call more than once.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
