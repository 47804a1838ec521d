//! Logger setup. Called once from `main` before any command runs.

use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogSettings;

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;

/// Overrides the level with a full filter directive, e.g. `forgeops_core=debug`.
pub const LOG_FILTER_ENV: &str = "FORGEOPS_LOG";

/// The filter used when `FORGEOPS_LOG` is not set.
pub fn default_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::new(settings.level.as_str().to_ascii_lowercase())
}

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
pub fn init(settings: &LogSettings) {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| default_filter(settings));
    let registry = tracing_subscriber::registry().with(filter);

    if settings.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }

    if let Some(rejected) = &settings.rejected_level {
        warn!(
            event = "log_level_invalid",
            requested = %rejected,
            "Unknown log level, using INFO"
        );
    }
}
