//! Configuration snapshots attached to result documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ss_common::Role;

use crate::analysis::AnalysisConfig;
use crate::resolve::{ConfigPaths, ConfigSource};

/// Provenance of the configuration a result was computed with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the config was loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// Source of the configuration.
    pub source: String,

    /// SHA-256 of the config file content, or of the canonical JSON of the
    /// built-in config.
    pub hash: String,

    pub summary: ConfigSummary,
}

/// Key configuration values for quick reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub luminosity_pb: f64,
    pub signal_samples: Vec<String>,
    pub background_samples: Vec<String>,
    pub working_points: Vec<String>,
}

impl ConfigSnapshot {
    /// Snapshot a config loaded from `raw` file content.
    pub fn new(config: &AnalysisConfig, paths: &ConfigPaths, raw: Option<&str>) -> Self {
        let hash = match raw {
            Some(content) => hash_content(content),
            None => hash_content(&serde_json::to_string(config).unwrap_or_default()),
        };

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            path: paths.analysis.as_ref().map(|p| p.display().to_string()),
            source: paths.source.to_string(),
            hash,
            summary: ConfigSummary::of(config),
        }
    }

    /// Snapshot of the built-in configuration.
    pub fn builtin(config: &AnalysisConfig) -> Self {
        let paths = ConfigPaths {
            analysis: None,
            source: ConfigSource::BuiltinDefault,
        };
        Self::new(config, &paths, None)
    }

    /// Short identifier (first 12 hex chars of the hash).
    pub fn short_id(&self) -> &str {
        &self.hash[..12.min(self.hash.len())]
    }
}

impl ConfigSummary {
    fn of(config: &AnalysisConfig) -> Self {
        let names = |role| {
            config
                .samples_with_role(role)
                .map(|s| s.name.clone())
                .collect::<Vec<_>>()
        };
        ConfigSummary {
            luminosity_pb: config.luminosity_pb,
            signal_samples: names(Role::Signal),
            background_samples: names(Role::Background),
            working_points: config.working_points.keys().cloned().collect(),
        }
    }
}

/// Hex SHA-256 of a string.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
