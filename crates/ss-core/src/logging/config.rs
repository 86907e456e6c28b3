//! Logging configuration.
//!
//! Supports configuration via:
//! - Environment variables (SIGSCAN_LOG, RUST_LOG, SIGSCAN_LOG_FORMAT)
//! - CLI flags (-v, -q)

use serde::{Deserialize, Serialize};

pub const ENV_LOG_LEVEL: &str = "SIGSCAN_LOG";
pub const ENV_LOG_FORMAT: &str = "SIGSCAN_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "json" | "jsonl" | "structured" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    /// Sweep summaries (default).
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// One step more verbose per `-v`.
    pub fn louder(self, steps: u8) -> Self {
        let mut level = self;
        for _ in 0..steps {
            level = match level {
                LogLevel::Off => LogLevel::Error,
                LogLevel::Error => LogLevel::Warn,
                LogLevel::Warn => LogLevel::Info,
                LogLevel::Info => LogLevel::Debug,
                LogLevel::Debug | LogLevel::Trace => LogLevel::Trace,
            };
        }
        level
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" | "quiet" => Ok(LogLevel::Off),
            _ => Err(format!("unknown log level: {}", s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
            LogLevel::Off => tracing_subscriber::filter::LevelFilter::OFF,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Include timestamps in human output.
    pub timestamps: bool,
    /// Allow ANSI colors in human output; still requires a terminal.
    pub color: bool,
    /// Raw `RUST_LOG` directives, used verbatim when `SIGSCAN_LOG` is unset.
    pub directives: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
            color: true,
            directives: None,
        }
    }
}

impl LogConfig {
    /// Create config from the process environment and CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    /// Like [`LogConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F, cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LogConfig::default();

        // SIGSCAN_LOG takes precedence over RUST_LOG
        if let Some(level) = lookup(ENV_LOG_LEVEL).and_then(|v| v.parse::<LogLevel>().ok()) {
            config.level = level;
        } else if let Some(directives) = lookup("RUST_LOG").filter(|v| !v.trim().is_empty()) {
            config.directives = Some(directives);
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT).and_then(|v| v.parse::<LogFormat>().ok()) {
            config.format = format;
        }

        if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            config.color = false;
        }

        // CLI overrides take final precedence
        if let Some(level) = cli_level {
            config.level = level;
            config.directives = None;
        }
        if let Some(format) = cli_format {
            config.format = format;
        }

        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Whether human output should carry ANSI escapes on a stream that is
    /// (or is not) a terminal.
    pub fn use_ansi(&self, is_terminal: bool) -> bool {
        self.color && is_terminal
    }
}
