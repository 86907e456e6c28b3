//! Exit codes for the sigscan CLI.
//!
//! Exit code ranges:
//! - 0: success
//! - 10-19: user/input errors (fixable by changing arguments, config or input)
//! - 20-29: I/O errors

use ss_common::error::ErrorCategory;
use ss_common::Error;

/// Exit codes for sigscan commands.
///
/// These codes are a stable contract for scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Clean = 0,

    // ========================================================================
    // User / Input Errors (10-19)
    // ========================================================================
    /// Invalid arguments (bad cut expression, negative branching fraction, ...).
    ArgsError = 10,

    /// Analysis config missing or invalid.
    ConfigError = 11,

    /// Selection input inconsistent or lacking an entry.
    DataError = 12,

    /// Config schema version mismatch.
    VersionError = 13,

    // ========================================================================
    // I/O Errors (20-29)
    // ========================================================================
    /// I/O error.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Codes 10-19: resolvable by user action.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Name of the code for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::DataError => "ERR_DATA",
            ExitCode::VersionError => "ERR_VERSION",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidCut { .. } | Error::InvalidArgument(_) => ExitCode::ArgsError,
            Error::Json(_) => ExitCode::DataError,
            _ => match err.category() {
                ErrorCategory::Config => ExitCode::ConfigError,
                ErrorCategory::Data => ExitCode::DataError,
                ErrorCategory::Io => ExitCode::IoError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
