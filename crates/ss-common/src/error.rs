//! Error types for sigscan.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Unknown Sample
//!   Reason: unknown sample: p8_ee_Zbb_ecm91
//!   Fix: Check the sample names in the analysis config against the selection input.
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 12,
//!   "category": "config",
//!   "message": "unknown sample: p8_ee_Zbb_ecm91",
//!   "recoverable": true,
//!   "suggested_action": "fix_config",
//!   "context": { "sample": "p8_ee_Zbb_ecm91" }
//! }
//! ```
//!
//! Degenerate numeric cases (zero denominators, S+B = 0) are never errors;
//! they resolve to defined values in `ss-math`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for sigscan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Analysis configuration and user-supplied names (samples, branches, cuts).
    Config,
    /// Selection source contents (summary tables, event scores).
    Data,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Data => write!(f, "data"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested follow-up for callers driving sigscan from scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Edit the analysis configuration.
    FixConfig,
    /// Fix or regenerate the selection input file.
    FixInput,
    /// Retry the operation.
    Retry,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::FixConfig => write!(f, "fix_config"),
            SuggestedAction::FixInput => write!(f, "fix_input"),
            SuggestedAction::Retry => write!(f, "retry"),
        }
    }
}

/// Unified error type for sigscan.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("unknown sample: {name}")]
    UnknownSample { name: String },

    #[error("unknown cut branch '{branch}' for sample {sample}")]
    UnknownBranch { sample: String, branch: String },

    #[error("invalid cut expression '{expr}': {reason}")]
    InvalidCut { expr: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Data errors (20-29)
    #[error("no selected count for cut '{cut}' in sample {sample}")]
    MissingCut { sample: String, cut: String },

    #[error("invalid selection table: {0}")]
    InvalidTable(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Data errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::UnknownSample { .. } => 12,
            Error::UnknownBranch { .. } => 13,
            Error::InvalidCut { .. } => 14,
            Error::InvalidArgument(_) => 15,
            Error::MissingCut { .. } => 20,
            Error::InvalidTable(_) => 21,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnknownSample { .. }
            | Error::UnknownBranch { .. }
            | Error::InvalidCut { .. }
            | Error::InvalidArgument(_) => ErrorCategory::Config,

            Error::MissingCut { .. } | Error::InvalidTable(_) => ErrorCategory::Data,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable by the user.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::UnknownSample { .. }
            | Error::UnknownBranch { .. }
            | Error::InvalidCut { .. }
            | Error::InvalidArgument(_) => true,

            Error::MissingCut { .. } => true,
            Error::InvalidTable(_) => true,

            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns the suggested action for scripted callers.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::UnknownSample { .. } => SuggestedAction::FixConfig,
            Error::UnknownBranch { .. } => SuggestedAction::FixConfig,
            Error::InvalidCut { .. } => SuggestedAction::FixConfig,
            Error::InvalidArgument(_) => SuggestedAction::FixConfig,

            Error::MissingCut { .. } => SuggestedAction::FixInput,
            Error::InvalidTable(_) => SuggestedAction::FixInput,

            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::FixInput,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::UnknownSample { .. } => {
                "Check the sample names in the analysis config against the selection input."
            }
            Error::UnknownBranch { .. } => {
                "The cut refers to a branch the selection input does not store. Check the branch name."
            }
            Error::InvalidCut { .. } => {
                "Cuts look like '(EVT_MVA1 > 0.9) & (EVT_MVA2 > 0.5)'. Supported operators: > >= < <= ==."
            }
            Error::InvalidArgument(_) => {
                "Check the command-line arguments with 'sigscan <command> --help'."
            }
            Error::MissingCut { .. } => {
                "The summary table has no entry for this cut. Regenerate it with the swept cut values."
            }
            Error::InvalidTable(_) => {
                "Selected counts must not exceed preselected counts, which must not exceed processed counts."
            }
            Error::Io(_) => "Check that the file exists and is readable. Retry the operation.",
            Error::Json(_) => "Invalid JSON in file. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::UnknownSample { .. } => "Unknown Sample",
            Error::UnknownBranch { .. } => "Unknown Cut Branch",
            Error::InvalidCut { .. } => "Invalid Cut Expression",
            Error::InvalidArgument(_) => "Invalid Argument",
            Error::MissingCut { .. } => "Missing Cut Entry",
            Error::InvalidTable(_) => "Invalid Selection Table",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for scripted callers.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., sample, cut).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::UnknownSample { name } => {
                context.insert("sample".to_string(), serde_json::json!(name));
            }
            Error::UnknownBranch { sample, branch } => {
                context.insert("sample".to_string(), serde_json::json!(sample));
                context.insert("branch".to_string(), serde_json::json!(branch));
            }
            Error::InvalidCut { expr, .. } => {
                context.insert("cut".to_string(), serde_json::json!(expr));
            }
            Error::MissingCut { sample, cut } => {
                context.insert("sample".to_string(), serde_json::json!(sample));
                context.insert("cut".to_string(), serde_json::json!(cut));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
