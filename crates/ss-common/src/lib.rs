//! sigscan common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the sigscan crates:
//! - Sample roles (signal / background)
//! - Run identifiers and schema versioning
//! - Common error types
//! - Output formats

pub mod error;
pub mod id;
pub mod output;
pub mod role;

pub use error::{Error, Result, StructuredError};
pub use id::RunId;
pub use output::OutputFormat;
pub use role::Role;

/// Schema version of the JSON documents emitted by sigscan.
pub const SCHEMA_VERSION: &str = "1.0.0";
