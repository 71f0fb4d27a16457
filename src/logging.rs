// src/logging.rs

//! Logging setup for `extproc` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. explicit `level` argument (if provided)
//! 2. `EXTPROC_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that stdout stays free for whatever the host
//! application prints.

use anyhow::Result;
use tracing_subscriber::fmt;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup. Host applications that install their own
/// subscriber should skip this; every diagnostic in the crate goes through
/// plain `tracing` macros and works with any subscriber.
pub fn init_logging(level: Option<tracing::Level>) -> Result<()> {
    let level = match level {
        Some(lvl) => lvl,
        None => std::env::var("EXTPROC_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    // Send logs to stderr; keep stdout free for the host application.
    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
