//! Selection efficiency with binomial counting uncertainty.
//!
//! For `k` events surviving a cut out of `N` considered:
//!
//! - `eff = k / N`
//! - `err = sqrt(eff · (1 − eff) / N)`
//!
//! The same formula is used for every efficiency sigscan reports, whether the
//! denominator is the processed (raw) or the preselected event count.
//! A zero denominator yields `0 ± 0` instead of failing.

use serde::{Deserialize, Serialize};

/// Which event count a cut efficiency is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denominator {
    /// Events after preselection (cut efficiency only).
    #[default]
    Preselected,
    /// All processed events (includes the preselection efficiency).
    Processed,
}

impl Denominator {
    /// `raw = true` selects the processed count.
    pub fn from_raw(raw: bool) -> Self {
        if raw {
            Denominator::Processed
        } else {
            Denominator::Preselected
        }
    }

    pub fn is_raw(self) -> bool {
        matches!(self, Denominator::Processed)
    }
}

/// An efficiency and its statistical uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Efficiency {
    pub value: f64,
    pub error: f64,
}

impl Efficiency {
    /// Sentinel for an empty denominator.
    pub const ZERO: Efficiency = Efficiency {
        value: 0.0,
        error: 0.0,
    };

    /// Efficiency of `selected` events out of `total`.
    ///
    /// `selected` is clamped into `[0, total]`; a non-positive or non-finite
    /// `total` returns [`Efficiency::ZERO`].
    pub fn from_counts(selected: f64, total: f64) -> Self {
        if !total.is_finite() || total <= 0.0 {
            return Efficiency::ZERO;
        }
        let k = if selected.is_nan() {
            0.0
        } else {
            selected.clamp(0.0, total)
        };
        let value = (k / total).clamp(0.0, 1.0);
        Efficiency {
            value,
            error: binomial_error(value, total),
        }
    }
}

/// Binomial standard error of an efficiency measured on `n` trials.
///
/// Returns 0 for `n <= 0`.
pub fn binomial_error(eff: f64, n: f64) -> f64 {
    if !n.is_finite() || n <= 0.0 {
        return 0.0;
    }
    let p = eff.clamp(0.0, 1.0);
    (p * (1.0 - p) / n).max(0.0).sqrt()
}
