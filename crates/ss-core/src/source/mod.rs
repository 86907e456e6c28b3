//! Selection sources: where event counts come from.
//!
//! The sweep drivers only need three numbers per sample: how many events
//! were processed, how many survived preselection, and how many survive a
//! given cut. [`SelectionSource`] abstracts over the two input files sigscan
//! understands:
//!
//! - [`SummaryTable`]: pre-counted yields keyed by cut expression
//! - [`EventScores`]: per-event branch values, counted on demand
//!
//! Both are JSON documents with a `kind` tag so one `--input` flag can load
//! either.

pub mod scores;
pub mod table;

pub use scores::{EventScores, ScoreRecord};
pub use table::{SummaryRecord, SummaryTable};

use serde::{Deserialize, Serialize};
use ss_common::{Error, Result};
use ss_math::{Denominator, Efficiency};
use std::path::Path;

use crate::cut::Cut;

/// Provider of per-sample event counts.
pub trait SelectionSource {
    /// Events processed before any selection.
    fn processed(&self, sample: &str) -> Result<f64>;

    /// Events surviving preselection.
    fn preselected(&self, sample: &str) -> Result<f64>;

    /// Preselected events that also pass `cut`. The empty cut returns
    /// [`SelectionSource::preselected`].
    fn selected(&self, sample: &str, cut: &Cut) -> Result<f64>;

    /// Names of the samples this source knows about.
    fn samples(&self) -> Vec<String>;

    fn denominator(&self, sample: &str, denominator: Denominator) -> Result<f64> {
        match denominator {
            Denominator::Preselected => self.preselected(sample),
            Denominator::Processed => self.processed(sample),
        }
    }

    /// Binomial efficiency of `cut` for one sample.
    fn efficiency(&self, sample: &str, cut: &Cut, denominator: Denominator) -> Result<Efficiency> {
        let selected = self.selected(sample, cut)?;
        let total = self.denominator(sample, denominator)?;
        Ok(Efficiency::from_counts(selected, total))
    }
}

/// A selection input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SelectionFile {
    Summary(SummaryTable),
    Scores(EventScores),
}

impl SelectionFile {
    /// Load and validate a selection file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: SelectionFile = serde_json::from_str(json)?;
        match file {
            SelectionFile::Summary(table) => Ok(SelectionFile::Summary(table.canonicalize()?)),
            SelectionFile::Scores(scores) => {
                scores.validate()?;
                Ok(SelectionFile::Scores(scores))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SelectionFile::Summary(_) => "summary",
            SelectionFile::Scores(_) => "scores",
        }
    }

    pub fn as_source(&self) -> &dyn SelectionSource {
        match self {
            SelectionFile::Summary(table) => table,
            SelectionFile::Scores(scores) => scores,
        }
    }
}

pub(crate) fn unknown_sample(name: &str) -> Error {
    Error::UnknownSample {
        name: name.to_string(),
    }
}

pub(crate) fn check_count(sample: &str, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidTable(format!(
            "{}: {} must be a non-negative number, got {}",
            sample, field, value
        )));
    }
    Ok(())
}
