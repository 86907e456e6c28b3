//! Significance `S / sqrt(S + B)` and its background-uncertainty band.
//!
//! The band re-evaluates the formula at `B ± σB`; signal uncertainty is not
//! propagated. The inverse metric `sqrt(S + B) / S` is reported alongside,
//! with its band obtained by inverting the significance band.
//!
//! Degenerate inputs never panic: a denominator `S + B` that is not strictly
//! positive and finite produces NaN, so one bad sweep point leaves the rest
//! of a series intact.

use serde::{Deserialize, Serialize};

use super::aggregate::YieldSum;

/// `S / sqrt(S + B)`, NaN when `S + B <= 0` or either input is not finite.
pub fn significance(s: f64, b: f64) -> f64 {
    if !s.is_finite() || !b.is_finite() {
        return f64::NAN;
    }
    let total = s + b;
    if total <= 0.0 {
        return f64::NAN;
    }
    s / total.sqrt()
}

/// `1 / significance`; NaN stays NaN, zero maps to +inf.
pub fn relative_uncertainty(significance: f64) -> f64 {
    if significance.is_nan() {
        return f64::NAN;
    }
    1.0 / significance
}

/// Significance at one point with its ±σB band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Significance {
    /// `S / sqrt(S + B)`.
    pub value: f64,
    /// `S / sqrt(S + B + σB)`.
    pub lower: f64,
    /// `S / sqrt(S + B − σB)`.
    pub upper: f64,
    /// `sqrt(S + B) / S`.
    pub uncertainty: f64,
    /// `1 / upper`.
    pub uncertainty_lower: f64,
    /// `1 / lower`.
    pub uncertainty_upper: f64,
}

impl Significance {
    pub fn compute(s: f64, b: f64, sigma_b: f64) -> Self {
        let sigma_b = if sigma_b.is_finite() { sigma_b.abs() } else { 0.0 };
        let value = significance(s, b);
        let lower = significance(s, b + sigma_b);
        let upper = significance(s, b - sigma_b);
        Significance {
            value,
            lower,
            upper,
            uncertainty: relative_uncertainty(value),
            uncertainty_lower: relative_uncertainty(upper),
            uncertainty_upper: relative_uncertainty(lower),
        }
    }

    pub fn from_yields(sum: &YieldSum) -> Self {
        Self::compute(sum.signal, sum.background, sum.background_sigma())
    }

    pub fn is_defined(&self) -> bool {
        !self.value.is_nan()
    }
}
