//! Logging setup for the REPL.
//!
//! Logs go to stderr so they do not interleave with command output on
//! stdout. Set `DEBUG_LOGGING=1` to enable debug output for the statclock
//! crates; otherwise the filter from `LogConfig` applies.

use statclock_types::LogConfig;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,statclock_core=debug,statclock_cli=debug";

/// Install the global subscriber. Call once, before the first command.
pub fn init(config: &LogConfig) {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let filter = if debug_logging {
        EnvFilter::new(DEBUG_DIRECTIVE)
    } else {
        EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
            eprintln!("Invalid log filter '{}': {e}, using info", config.filter);
            EnvFilter::new("info")
        })
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_target)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    tracing::debug!(debug_logging, "statclock logging initialized");
}
