//! Run identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier attached to every result document and log line of one invocation.
///
/// Format: `run-YYYYMMDD-HHMMSS-xxxxxxxx` where the suffix is the first
/// eight hex digits of a v4 UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new run ID.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        RunId(format!(
            "run-{}-{}-{}",
            now.format("%Y%m%d"),
            now.format("%H%M%S"),
            &uuid[..8]
        ))
    }

    /// Parse an existing run ID string.
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix("run-")?;
        let mut parts = rest.split('-');
        let date = parts.next()?;
        let time = parts.next()?;
        let suffix = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if time.len() != 6 || !time.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if suffix.len() != 8 || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(RunId(s.to_string()))
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_run_id_parses() {
        let id = RunId::new();
        assert!(RunId::parse(&id.0).is_some(), "{} should parse", id);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(RunId::parse("").is_none());
        assert!(RunId::parse("pt-20260115-143022-a7xq").is_none());
        assert!(RunId::parse("run-2026011-143022-deadbeef").is_none());
        assert!(RunId::parse("run-20260115-143022-xyz").is_none());
        assert!(RunId::parse("run-20260115-143022-deadbeef-1").is_none());
    }

    #[test]
    fn parse_accepts_wellformed() {
        let id = RunId::parse("run-20260115-143022-deadbeef").unwrap();
        assert_eq!(id.to_string(), "run-20260115-143022-deadbeef");
    }
}
