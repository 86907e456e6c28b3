//! sigscan configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the analysis configuration (samples, working points, sweep defaults)
//! - Built-in defaults for the B_s → νν̄ study
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation
//! - Config snapshots for result provenance

pub mod analysis;
pub mod defaults;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use analysis::{AnalysisConfig, SampleSpec, SweepDefaults};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_analysis, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
