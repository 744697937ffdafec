//! Tracing bootstrap for WealthSync binaries.
//!
//! Output goes to stderr: stdout is reserved for the MCP stdio transport.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive that overrides the default level.
pub const LOG_ENV: &str = "WEALTHSYNC_LOG";

pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Install the global fmt subscriber.
///
/// `WEALTHSYNC_LOG` wins over `level` when set. Calling this twice returns an
/// error instead of panicking.
pub fn init_tracing(level: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing subscriber: {e}"))
}
