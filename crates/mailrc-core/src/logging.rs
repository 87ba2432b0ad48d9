//! Logging bootstrap for binaries and tests embedding the registry

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Error returned when a subscriber cannot be installed
pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Initialize a tracing subscriber with default configuration.
///
/// Uses the `RUST_LOG` environment variable to pick the level, defaulting
/// to "info". Fails, rather than panicking, if a global subscriber is
/// already installed.
pub fn init() -> Result<(), InitError> {
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    install(filter_layer)
}

/// Initialize a subscriber with explicit filter directives,
/// e.g. `"mailrc_core=debug"`.
pub fn init_with_filter(directives: &str) -> Result<(), InitError> {
    install(EnvFilter::try_new(directives)?)
}

fn install(filter_layer: EnvFilter) -> Result<(), InitError> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
