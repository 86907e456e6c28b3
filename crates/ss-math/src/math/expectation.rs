//! Expected event yields.
//!
//! `N = eff · σ · L · s · f`, where `σ` is the sample cross-section, `L` the
//! integrated luminosity, `s` a per-sample luminosity scale and `f` the
//! assumed branching fraction for signal samples (1 for background).
//! The uncertainty is the efficiency uncertainty times the same factor.

use serde::{Deserialize, Serialize};
use ss_common::Role;

use super::efficiency::Efficiency;

/// Luminosity normalization of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    /// Cross-section in pb (for signal: the production rate before the
    /// branching fraction is applied).
    pub cross_section_pb: f64,
    /// Integrated luminosity in pb⁻¹.
    pub luminosity_pb: f64,
    /// Extra multiplicative weight, 1 for most samples.
    pub lumi_scale: f64,
}

impl Normalization {
    pub fn new(cross_section_pb: f64, luminosity_pb: f64) -> Self {
        Normalization {
            cross_section_pb,
            luminosity_pb,
            lumi_scale: 1.0,
        }
    }

    pub fn with_lumi_scale(mut self, lumi_scale: f64) -> Self {
        self.lumi_scale = lumi_scale;
        self
    }

    /// Number of produced events, σ · L · s.
    pub fn produced(&self) -> f64 {
        self.cross_section_pb * self.luminosity_pb * self.lumi_scale
    }
}

/// Branching-fraction factor for a sample role.
///
/// Negative or NaN fractions are treated as zero.
pub fn role_factor(role: Role, branching_fraction: f64) -> f64 {
    if !role.is_signal() {
        return 1.0;
    }
    if branching_fraction.is_nan() {
        return 0.0;
    }
    branching_fraction.max(0.0)
}

/// An expected event count and its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Expectation {
    pub value: f64,
    pub error: f64,
}

impl Expectation {
    /// Scale an efficiency into an expected yield.
    pub fn scale(
        eff: &Efficiency,
        norm: &Normalization,
        role: Role,
        branching_fraction: f64,
    ) -> Self {
        let factor = (norm.produced() * role_factor(role, branching_fraction)).max(0.0);
        Expectation {
            value: eff.value * factor,
            error: eff.error * factor,
        }
    }

    pub fn variance(&self) -> f64 {
        self.error * self.error
    }
}
