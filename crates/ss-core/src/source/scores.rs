//! Event scores: per-event branch values for the preselected events.

use serde::{Deserialize, Serialize};
use ss_common::{Error, Result};
use std::collections::BTreeMap;

use super::{check_count, unknown_sample, SelectionSource};
use crate::cut::Cut;

/// Branch columns of one sample. Every column has one entry per preselected
/// event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub events_processed: f64,
    pub branches: BTreeMap<String, Vec<f64>>,
}

impl ScoreRecord {
    /// Number of preselected events (length of the columns).
    pub fn len(&self) -> usize {
        self.branches.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn count_passing(&self, sample: &str, cut: &Cut) -> Result<usize> {
        let mut columns = Vec::with_capacity(cut.conditions().len());
        for cond in cut.conditions() {
            let column = self
                .branches
                .get(&cond.branch)
                .ok_or_else(|| Error::UnknownBranch {
                    sample: sample.to_string(),
                    branch: cond.branch.clone(),
                })?;
            columns.push((cond, column));
        }

        Ok((0..self.len())
            .filter(|&i| columns.iter().all(|(cond, column)| cond.holds(column[i])))
            .count())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventScores {
    pub samples: BTreeMap<String, ScoreRecord>,
}

impl EventScores {
    /// Columns of a sample must have equal length, not exceeding the
    /// processed count.
    pub fn validate(&self) -> Result<()> {
        for (name, record) in &self.samples {
            check_count(name, "events_processed", record.events_processed)?;
            let n = record.len();
            if let Some((branch, column)) = record.branches.iter().find(|(_, c)| c.len() != n) {
                return Err(Error::InvalidTable(format!(
                    "{}: branch {} has {} entries, expected {}",
                    name,
                    branch,
                    column.len(),
                    n
                )));
            }
            if n as f64 > record.events_processed {
                return Err(Error::InvalidTable(format!(
                    "{}: {} preselected events exceed events_processed ({})",
                    name, n, record.events_processed
                )));
            }
        }
        Ok(())
    }

    fn record(&self, sample: &str) -> Result<&ScoreRecord> {
        self.samples.get(sample).ok_or_else(|| unknown_sample(sample))
    }
}

impl SelectionSource for EventScores {
    fn processed(&self, sample: &str) -> Result<f64> {
        Ok(self.record(sample)?.events_processed)
    }

    fn preselected(&self, sample: &str) -> Result<f64> {
        Ok(self.record(sample)?.len() as f64)
    }

    fn selected(&self, sample: &str, cut: &Cut) -> Result<f64> {
        let record = self.record(sample)?;
        Ok(record.count_passing(sample, cut)? as f64)
    }

    fn samples(&self) -> Vec<String> {
        self.samples.keys().cloned().collect()
    }
}
