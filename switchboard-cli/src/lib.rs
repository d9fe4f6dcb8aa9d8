//! Shared setup for the `switchboard` and `switchboard-provider` binaries.

use tracing_subscriber::EnvFilter;

/// Set to `json` for machine-readable logs
pub const LOG_FORMAT_ENV: &str = "SWITCHBOARD_LOG_FORMAT";

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` overrides `default_directive`. Stdout is left alone: it carries
/// MCP messages in providers and the transcript in the orchestrator.
pub fn init_tracing(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
