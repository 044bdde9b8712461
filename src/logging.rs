//! Tracing subscriber setup
//!
//! Logs go to stderr so that list/show output on stdout stays pipeable.

use tracing_subscriber::EnvFilter;

/// Pick the filter directive
///
/// `RUST_LOG` wins, then `--verbose`, then the configured level, then the
/// given default.
pub fn filter_directive(verbose: bool, configured: Option<&str>, default: &str) -> String {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !env.trim().is_empty() {
            return env;
        }
    }
    resolve(verbose, configured, default)
}

fn resolve(verbose: bool, configured: Option<&str>, default: &str) -> String {
    if verbose {
        return "debug".to_string();
    }
    configured
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Install the global subscriber; later calls are ignored
pub fn init(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
