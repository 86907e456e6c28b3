//! Configuration validation errors and semantic validation.

use std::collections::HashSet;
use thiserror::Error;

use crate::analysis::{AnalysisConfig, SampleSpec, SweepDefaults};
use ss_common::Role;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate an analysis configuration semantically.
pub fn validate_analysis(config: &AnalysisConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if !config.luminosity_pb.is_finite() || config.luminosity_pb <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "luminosity_pb".to_string(),
            message: format!("Must be positive, got {}", config.luminosity_pb),
        });
    }

    if config.samples.is_empty() {
        return Err(ValidationError::SemanticError(
            "at least one sample is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for (idx, sample) in config.samples.iter().enumerate() {
        validate_sample(idx, sample)?;
        if !seen.insert(sample.name.as_str()) {
            return Err(ValidationError::SemanticError(format!(
                "duplicate sample name: {}",
                sample.name
            )));
        }
    }

    if config.samples_with_role(Role::Signal).next().is_none() {
        return Err(ValidationError::SemanticError(
            "at least one sample must have role 'signal'".to_string(),
        ));
    }

    for (name, conditions) in &config.working_points {
        if name.trim().is_empty() {
            return Err(ValidationError::SemanticError(
                "working point names must not be empty".to_string(),
            ));
        }
        if conditions.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("working_points.{}", name),
                message: "must contain at least one condition".to_string(),
            });
        }
        if conditions.iter().any(|c| c.trim().is_empty()) {
            return Err(ValidationError::InvalidValue {
                field: format!("working_points.{}", name),
                message: "conditions must not be empty".to_string(),
            });
        }
    }

    validate_sweep(&config.sweep)?;

    if let Some(ref wp) = config.sweep.working_point {
        if !config.working_points.contains_key(wp) {
            return Err(ValidationError::InvalidValue {
                field: "sweep.working_point".to_string(),
                message: format!("unknown working point '{}'", wp),
            });
        }
    }

    Ok(())
}

fn validate_sample(idx: usize, sample: &SampleSpec) -> ValidationResult<()> {
    if sample.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("samples[{}].name", idx),
            message: "must not be empty".to_string(),
        });
    }

    if !sample.cross_section_pb.is_finite() || sample.cross_section_pb < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("samples.{}.cross_section_pb", sample.name),
            message: format!("Must be non-negative, got {}", sample.cross_section_pb),
        });
    }

    if !sample.lumi_scale.is_finite() || sample.lumi_scale < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("samples.{}.lumi_scale", sample.name),
            message: format!("Must be non-negative, got {}", sample.lumi_scale),
        });
    }

    Ok(())
}

fn validate_sweep(sweep: &SweepDefaults) -> ValidationResult<()> {
    if let Some(ref branch) = sweep.branch {
        if branch.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "sweep.branch".to_string(),
                message: "must not be empty".to_string(),
            });
        }
    }

    if sweep.cut_values.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "sweep.cut_values".to_string(),
            message: "must contain at least one value".to_string(),
        });
    }
    if let Some(bad) = sweep.cut_values.iter().find(|v| !v.is_finite()) {
        return Err(ValidationError::InvalidValue {
            field: "sweep.cut_values".to_string(),
            message: format!("values must be finite, got {}", bad),
        });
    }

    if !sweep.branching_fraction.is_finite() || sweep.branching_fraction < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "sweep.branching_fraction".to_string(),
            message: format!("Must be non-negative, got {}", sweep.branching_fraction),
        });
    }

    let [lo, hi] = sweep.bf_exp_range;
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(ValidationError::InvalidValue {
            field: "sweep.bf_exp_range".to_string(),
            message: format!("must be finite and ascending, got [{}, {}]", lo, hi),
        });
    }

    if sweep.bf_points == 0 {
        return Err(ValidationError::InvalidValue {
            field: "sweep.bf_points".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::builtin;

    #[test]
    fn test_rejects_version_mismatch() {
        let mut config = builtin();
        config.schema_version = "0.9.0".to_string();
        assert!(matches!(
            validate_analysis(&config),
            Err(ValidationError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_nonpositive_luminosity() {
        let mut config = builtin();
        config.luminosity_pb = 0.0;
        let err = validate_analysis(&config).unwrap_err();
        assert_eq!(err.code(), 65);
    }

    #[test]
    fn test_rejects_duplicate_samples() {
        let mut config = builtin();
        let dup = config.samples[1].clone();
        config.samples.push(dup);
        assert!(matches!(
            validate_analysis(&config),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn test_requires_signal_sample() {
        let mut config = builtin();
        config.samples.retain(|s| s.role == Role::Background);
        let err = validate_analysis(&config).unwrap_err();
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_rejects_negative_cross_section() {
        let mut config = builtin();
        config.samples[0].cross_section_pb = -1.0;
        assert!(matches!(
            validate_analysis(&config),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_default_working_point() {
        let mut config = builtin();
        config.sweep.working_point = Some("wp9".to_string());
        let err = validate_analysis(&config).unwrap_err();
        assert!(err.to_string().contains("wp9"));
    }

    #[test]
    fn test_rejects_bad_sweep() {
        let mut config = builtin();
        config.sweep.cut_values = vec![0.1, f64::NAN];
        assert!(validate_analysis(&config).is_err());

        let mut config = builtin();
        config.sweep.bf_exp_range = [-4.0, -7.0];
        assert!(validate_analysis(&config).is_err());

        let mut config = builtin();
        config.sweep.bf_points = 0;
        assert!(validate_analysis(&config).is_err());
    }
}
