//! Tracing subscriber setup for the `sortify` binary.

use tracing_subscriber::{EnvFilter, fmt};

/// Picks the filter directives: `RUST_LOG` when set and non-blank, otherwise
/// the configured level (`SORTIFY_LOG` or `--log`, already merged into
/// [`crate::AppConfig::log_level`]).
pub fn filter_directives(rust_log: Option<String>, configured_level: &str) -> String {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .unwrap_or_else(|| configured_level.to_string())
}

/// Initializes the global tracing subscriber.
///
/// Output goes to stderr so stdout stays clean for JSON rendering.
///
/// # Errors
/// Returns an error string when the directives are invalid or a global
/// subscriber is already installed.
pub fn init_tracing(configured_level: &str) -> Result<(), String> {
    let directives = filter_directives(std::env::var("RUST_LOG").ok(), configured_level);
    let filter = EnvFilter::try_new(&directives)
        .map_err(|error| format!("invalid log filter {directives:?}: {error}"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| error.to_string())
}
