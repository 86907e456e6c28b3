//! sigscan core library.
//!
//! This library provides the pieces behind the `sigscan` binary:
//! - Cut expressions and threshold families
//! - Selection sources (summary tables, per-event scores)
//! - Sweep drivers for efficiency, significance and branching-fraction scans
//! - Configuration loading, logging, output rendering and exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod cut;
pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod source;
pub mod sweep;

pub use cut::{threshold_family, Comparison, Condition, Cut};
pub use source::{EventScores, SelectionFile, SelectionSource, SummaryTable};
pub use sweep::{
    bf_scan, efficiency_scan, significance_scan, BranchingFractionScan, EfficiencyScan,
    SignificanceScan, SweepOptions, ThresholdSweep,
};
