//! Structured logging for sigscan.
//!
//! - stdout is reserved for command payloads (JSON/MD output)
//! - stderr receives all log output, human-readable or JSON lines
//! - every line of a run carries its `run_id` through the root span

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events pass the default filter.
const CRATES: [&str; 4] = ["ss_core", "ss_config", "ss_math", "sigscan"];

/// Build the filter for `config`.
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    if let Some(directives) = &config.directives {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }
    let directives = CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, config.level))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::new(directives)
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup. A second call is a no-op.
pub fn init_logging(config: &LogConfig) {
    let filter = build_filter(config);

    let result = match config.format {
        LogFormat::Human => {
            let use_ansi = config.use_ansi(std::io::stderr().is_terminal());
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    };

    if let Err(err) = result {
        tracing::debug!(error = %err, "logging already initialized");
    }
}
