//! `vendorkit_log` v1:
//! tracing-subscriber setup shared by vendorkit binaries.
//!
//! Logs go to stderr; stdout is left to the tools themselves.

use std::io::IsTerminal;

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the filter directives.
pub const C_ENV_LOG: &str = "RUST_LOG";
/// Directive used when [`C_ENV_LOG`] is unset or unparsable.
pub const C_LOG_DIRECTIVE_DEFAULT: &str = "warn";

/// Build the filter from [`C_ENV_LOG`], falling back to `directive_default`.
pub fn build_env_filter(directive_default: &str) -> EnvFilter {
    EnvFilter::try_from_env(C_ENV_LOG).unwrap_or_else(|_| EnvFilter::new(directive_default))
}

/// Install the global subscriber.
///
/// Fails only when a global subscriber is already set.
pub fn init_tracing(directive_default: &str) -> Result<(), TryInitError> {
    let b_if_ansi = std::io::stderr().is_terminal();
    tracing_subscriber::registry()
        .with(build_env_filter(directive_default))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(b_if_ansi),
        )
        .try_init()
}
