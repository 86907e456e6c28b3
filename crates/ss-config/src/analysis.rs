//! Analysis configuration types.
//!
//! A config file names the samples of the study, their roles and
//! normalizations, the named working points, and the defaults used when a
//! sweep is requested without explicit values. JSON and TOML are accepted.

use serde::{Deserialize, Serialize};
use ss_common::Role;
use ss_math::grid;
use ss_math::Normalization;
use std::collections::BTreeMap;
use std::path::Path;

use crate::validate::ValidationError;

/// Complete analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Integrated luminosity in pb⁻¹.
    pub luminosity_pb: f64,

    /// Samples in display order.
    pub samples: Vec<SampleSpec>,

    /// Named composite cuts, each a list of conditions combined with `&`.
    #[serde(default)]
    pub working_points: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub sweep: SweepDefaults,
}

/// One physics process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSpec {
    pub name: String,

    /// Display title (LaTeX or plain text); falls back to the name.
    #[serde(default)]
    pub title: Option<String>,

    pub role: Role,

    /// Cross-section in pb. For signal samples this is the production rate
    /// before the assumed branching fraction is applied.
    pub cross_section_pb: f64,

    #[serde(default = "default_lumi_scale")]
    pub lumi_scale: f64,
}

fn default_lumi_scale() -> f64 {
    1.0
}

impl SampleSpec {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// Defaults applied when a command does not specify sweep values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepDefaults {
    /// Discriminant branch swept by `efficiency` and `significance`.
    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default = "default_cut_values")]
    pub cut_values: Vec<f64>,

    /// Branching fraction assumed by cut sweeps.
    #[serde(default = "default_branching_fraction")]
    pub branching_fraction: f64,

    /// Decimal exponents bounding the branching-fraction grid.
    #[serde(default = "default_bf_exp_range")]
    pub bf_exp_range: [f64; 2],

    #[serde(default = "default_bf_points")]
    pub bf_points: usize,

    /// Working point used by `bf-scan` when no cut is given.
    #[serde(default)]
    pub working_point: Option<String>,
}

fn default_cut_values() -> Vec<f64> {
    grid::DEFAULT_CUT_VALUES.to_vec()
}

fn default_branching_fraction() -> f64 {
    grid::DEFAULT_BRANCHING_FRACTION
}

fn default_bf_exp_range() -> [f64; 2] {
    [grid::DEFAULT_BF_EXP_RANGE.0, grid::DEFAULT_BF_EXP_RANGE.1]
}

fn default_bf_points() -> usize {
    grid::DEFAULT_BF_POINTS
}

impl Default for SweepDefaults {
    fn default() -> Self {
        SweepDefaults {
            branch: None,
            cut_values: default_cut_values(),
            branching_fraction: default_branching_fraction(),
            bf_exp_range: default_bf_exp_range(),
            bf_points: default_bf_points(),
            working_point: None,
        }
    }
}

impl SweepDefaults {
    /// The default branching-fraction grid.
    pub fn bf_grid(&self) -> Vec<f64> {
        grid::logspace(self.bf_exp_range[0], self.bf_exp_range[1], self.bf_points)
    }
}

impl AnalysisConfig {
    /// Load a config file; `.toml` files are parsed as TOML, everything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_str_for_path(&content, path)
    }

    /// Parse file content, choosing the format from the file extension.
    pub fn from_str_for_path(content: &str, path: &Path) -> Result<Self, ValidationError> {
        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        if is_toml {
            Self::from_toml_str(content)
        } else {
            Self::from_json_str(content)
        }
    }

    /// Parse a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse a config from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ValidationError> {
        toml::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }

    pub fn sample(&self, name: &str) -> Option<&SampleSpec> {
        self.samples.iter().find(|s| s.name == name)
    }

    /// Samples with the given role, in config order.
    pub fn samples_with_role(&self, role: Role) -> impl Iterator<Item = &SampleSpec> {
        self.samples.iter().filter(move |s| s.role == role)
    }

    /// Luminosity normalization of a sample.
    pub fn normalization(&self, sample: &SampleSpec) -> Normalization {
        Normalization::new(sample.cross_section_pb, self.luminosity_pb)
            .with_lumi_scale(sample.lumi_scale)
    }

    pub fn working_point(&self, name: &str) -> Option<&[String]> {
        self.working_points.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "schema_version": "1.0.0",
        "luminosity_pb": 1000.0,
        "samples": [
            { "name": "sig", "role": "signal", "cross_section_pb": 2.0 },
            { "name": "bkg", "title": "Z → qq", "role": "background", "cross_section_pb": 50.0, "lumi_scale": 0.5 }
        ]
    }"#;

    #[test]
    fn test_parse_minimal_json() {
        let config = AnalysisConfig::from_json_str(MINIMAL).unwrap();
        assert_eq!(config.samples.len(), 2);
        assert_eq!(config.sample("sig").unwrap().lumi_scale, 1.0);
        assert_eq!(config.sample("sig").unwrap().title(), "sig");
        assert_eq!(config.sample("bkg").unwrap().title(), "Z → qq");
        assert!(config.working_points.is_empty());
        assert_eq!(config.sweep, SweepDefaults::default());
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
schema_version = "1.0.0"
luminosity_pb = 1.5e8

[[samples]]
name = "sig"
role = "signal"
cross_section_pb = 1.0

[working_points]
wp1 = ["EVT_MVA1 > 0.994", "EVT_MVA2 > 0.95"]

[sweep]
branch = "EVT_MVA1"
cut_values = [0.0, 0.5, 0.9]
"#;
        let config = AnalysisConfig::from_toml_str(text).unwrap();
        assert_eq!(config.working_point("wp1").unwrap().len(), 2);
        assert_eq!(config.sweep.cut_values, vec![0.0, 0.5, 0.9]);
        assert_eq!(config.sweep.branch.as_deref(), Some("EVT_MVA1"));
        assert_eq!(config.sweep.bf_points, 50);
    }

    #[test]
    fn test_normalization_includes_lumi_scale() {
        let config = AnalysisConfig::from_json_str(MINIMAL).unwrap();
        let bkg = config.sample("bkg").unwrap();
        assert_eq!(config.normalization(bkg).produced(), 50.0 * 1000.0 * 0.5);
    }

    #[test]
    fn test_samples_with_role_preserves_order() {
        let config = AnalysisConfig::from_json_str(MINIMAL).unwrap();
        let names: Vec<_> = config
            .samples_with_role(Role::Background)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["bkg"]);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = AnalysisConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }

    #[test]
    fn test_sweep_bf_grid() {
        let grid = SweepDefaults::default().bf_grid();
        assert_eq!(grid.len(), 50);
    }
}
