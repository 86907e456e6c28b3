//! Configuration loading for the sigscan CLI.
//!
//! This module handles:
//! - Config resolution order (CLI > env > XDG > system > built-in)
//! - Parsing JSON or TOML analysis configs
//! - Semantic validation, including working-point cut syntax
//! - Config snapshots for result provenance

pub use ss_config::validate::ValidationError;
pub use ss_config::{AnalysisConfig, ConfigSnapshot, ConfigSource};

use ss_common::{Error, Result};
use ss_config::defaults::builtin;
use ss_config::{resolve_config, validate_analysis};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::cut::Cut;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Invalid working point '{name}': {source}")]
    WorkingPoint {
        name: String,
        #[source]
        source: Error,
    },
}

impl ConfigError {
    /// Schema version problems get their own exit code.
    pub fn is_version_mismatch(&self) -> bool {
        matches!(
            self,
            ConfigError::ValidationError(ValidationError::VersionMismatch { .. })
        )
    }
}

/// Configuration resolution options.
#[derive(Debug, Default)]
pub struct ConfigOptions {
    /// Explicit config file (highest priority). Must exist.
    pub config_path: Option<PathBuf>,
}

/// A validated analysis config with its parsed working points.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub analysis: AnalysisConfig,
    pub snapshot: ConfigSnapshot,
    pub working_points: BTreeMap<String, Cut>,
}

impl ResolvedConfig {
    /// Validate `analysis` and parse its working points.
    pub fn from_analysis(
        analysis: AnalysisConfig,
        snapshot: ConfigSnapshot,
    ) -> std::result::Result<Self, ConfigError> {
        validate_analysis(&analysis)?;

        let mut working_points = BTreeMap::new();
        for (name, conditions) in &analysis.working_points {
            let cut = Cut::parse_all(conditions).map_err(|source| ConfigError::WorkingPoint {
                name: name.clone(),
                source,
            })?;
            working_points.insert(name.clone(), cut);
        }

        Ok(ResolvedConfig {
            analysis,
            snapshot,
            working_points,
        })
    }

    /// Resolve a cut argument: a working point name or a cut expression.
    pub fn resolve_cut(&self, spec: &str) -> Result<Cut> {
        match self.working_points.get(spec.trim()) {
            Some(cut) => Ok(cut.clone()),
            None => Cut::parse(spec),
        }
    }

    /// The cut used when no cut is given on the command line.
    pub fn default_cut(&self) -> Option<&Cut> {
        self.analysis
            .sweep
            .working_point
            .as_ref()
            .and_then(|name| self.working_points.get(name))
    }
}

/// Load configuration with the standard resolution order.
pub fn load_config(options: &ConfigOptions) -> std::result::Result<ResolvedConfig, ConfigError> {
    if let Some(path) = &options.config_path {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
    }

    let paths = resolve_config(options.config_path.as_deref());
    let Some(path) = paths.analysis.clone() else {
        tracing::debug!("no analysis config found; using built-in defaults");
        let analysis = builtin();
        let snapshot = ConfigSnapshot::builtin(&analysis);
        return ResolvedConfig::from_analysis(analysis, snapshot);
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::IoError {
        path: path.clone(),
        source,
    })?;
    let analysis = AnalysisConfig::from_str_for_path(&content, &path)?;
    let snapshot = ConfigSnapshot::new(&analysis, &paths, Some(&content));
    tracing::debug!(
        path = %path.display(),
        source = %paths.source,
        hash = snapshot.short_id(),
        "loaded analysis config"
    );

    ResolvedConfig::from_analysis(analysis, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(analysis: AnalysisConfig) -> std::result::Result<ResolvedConfig, ConfigError> {
        let snapshot = ConfigSnapshot::builtin(&analysis);
        ResolvedConfig::from_analysis(analysis, snapshot)
    }

    #[test]
    fn builtin_working_point_parses() {
        let config = resolved(builtin()).unwrap();
        let wp = config.default_cut().unwrap();
        assert_eq!(wp.to_string(), "(EVT_MVA1 > 0.994) & (EVT_MVA2 > 0.95)");
    }

    #[test]
    fn resolve_cut_prefers_working_point() {
        let config = resolved(builtin()).unwrap();
        assert_eq!(
            config.resolve_cut("wp1").unwrap(),
            *config.working_points.get("wp1").unwrap()
        );
        assert_eq!(
            config.resolve_cut("EVT_MVA1>0.5").unwrap().to_string(),
            "(EVT_MVA1 > 0.5)"
        );
        assert!(config.resolve_cut("wp2").is_err());
    }

    #[test]
    fn malformed_working_point_is_rejected() {
        let mut analysis = builtin();
        analysis
            .working_points
            .insert("bad".to_string(), vec!["EVT_MVA1 >> 1".to_string()]);
        let err = resolved(analysis).unwrap_err();
        assert!(matches!(err, ConfigError::WorkingPoint { ref name, .. } if name == "bad"));
    }

    #[test]
    fn explicit_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let options = ConfigOptions {
            config_path: Some(dir.path().join("missing.json")),
        };
        assert!(matches!(
            load_config(&options),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn explicit_path_is_loaded_and_hashed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        let content = serde_json::to_string(&builtin()).unwrap();
        std::fs::write(&path, &content).unwrap();

        let options = ConfigOptions {
            config_path: Some(path.clone()),
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.snapshot.source, ConfigSource::CliArgument.to_string());
        assert_eq!(
            config.snapshot.hash,
            ss_config::snapshot::hash_content(&content)
        );
    }

    #[test]
    fn version_mismatch_is_flagged() {
        let mut analysis = builtin();
        analysis.schema_version = "2.0.0".to_string();
        assert!(resolved(analysis).unwrap_err().is_version_mismatch());
    }
}
