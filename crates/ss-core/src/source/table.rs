//! Summary tables: selection counts already tallied per cut.

use serde::{Deserialize, Serialize};
use ss_common::{Error, Result};
use std::collections::BTreeMap;

use super::{check_count, unknown_sample, SelectionSource};
use crate::cut::Cut;

/// Per-sample counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub events_processed: f64,
    /// Events after preselection.
    pub events_selected: f64,
    /// Cut expression to selected count.
    #[serde(default)]
    pub cuts: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryTable {
    pub samples: BTreeMap<String, SummaryRecord>,
}

impl SummaryTable {
    /// Rewrite every cut key into canonical form and check count ordering.
    pub fn canonicalize(self) -> Result<Self> {
        let mut samples = BTreeMap::new();
        for (name, record) in self.samples {
            check_count(&name, "events_processed", record.events_processed)?;
            check_count(&name, "events_selected", record.events_selected)?;
            if record.events_selected > record.events_processed {
                return Err(Error::InvalidTable(format!(
                    "{}: events_selected ({}) exceeds events_processed ({})",
                    name, record.events_selected, record.events_processed
                )));
            }

            let mut cuts = BTreeMap::new();
            for (expr, count) in record.cuts {
                let key = Cut::parse(&expr)?.to_string();
                check_count(&name, &format!("cuts[{}]", key), count)?;
                if count > record.events_selected {
                    return Err(Error::InvalidTable(format!(
                        "{}: count for '{}' ({}) exceeds events_selected ({})",
                        name, key, count, record.events_selected
                    )));
                }
                if let Some(prev) = cuts.insert(key.clone(), count) {
                    if prev != count {
                        return Err(Error::InvalidTable(format!(
                            "{}: conflicting counts for '{}' ({} and {})",
                            name, key, prev, count
                        )));
                    }
                }
            }

            samples.insert(
                name,
                SummaryRecord {
                    events_processed: record.events_processed,
                    events_selected: record.events_selected,
                    cuts,
                },
            );
        }
        Ok(SummaryTable { samples })
    }

    fn record(&self, sample: &str) -> Result<&SummaryRecord> {
        self.samples.get(sample).ok_or_else(|| unknown_sample(sample))
    }
}

impl SelectionSource for SummaryTable {
    fn processed(&self, sample: &str) -> Result<f64> {
        Ok(self.record(sample)?.events_processed)
    }

    fn preselected(&self, sample: &str) -> Result<f64> {
        Ok(self.record(sample)?.events_selected)
    }

    fn selected(&self, sample: &str, cut: &Cut) -> Result<f64> {
        let record = self.record(sample)?;
        if cut.is_empty() {
            return Ok(record.events_selected);
        }
        let key = cut.to_string();
        record
            .cuts
            .get(&key)
            .copied()
            .ok_or_else(|| Error::MissingCut {
                sample: sample.to_string(),
                cut: key,
            })
    }

    fn samples(&self) -> Vec<String> {
        self.samples.keys().cloned().collect()
    }
}
