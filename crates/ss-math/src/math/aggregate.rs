//! Signal and background totals.
//!
//! Per-sample expectations are summed by role. Variances add in quadrature,
//! samples are assumed independent.

use serde::{Deserialize, Serialize};
use ss_common::Role;

use super::expectation::Expectation;

/// Aggregate S and B with their variances.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YieldSum {
    pub signal: f64,
    pub signal_var: f64,
    pub background: f64,
    pub background_var: f64,
}

impl YieldSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample's expectation to the total for its role.
    pub fn add(&mut self, role: Role, exp: &Expectation) {
        match role {
            Role::Signal => {
                self.signal += exp.value;
                self.signal_var += exp.variance();
            }
            Role::Background => {
                self.background += exp.value;
                self.background_var += exp.variance();
            }
        }
    }

    pub fn signal_sigma(&self) -> f64 {
        self.signal_var.max(0.0).sqrt()
    }

    pub fn background_sigma(&self) -> f64 {
        self.background_var.max(0.0).sqrt()
    }

    /// σB / B, NaN when there is no background.
    pub fn background_rel_uncertainty(&self) -> f64 {
        if self.background == 0.0 {
            return f64::NAN;
        }
        self.background_sigma() / self.background
    }
}

impl FromIterator<(Role, Expectation)> for YieldSum {
    fn from_iter<I: IntoIterator<Item = (Role, Expectation)>>(iter: I) -> Self {
        let mut sum = YieldSum::new();
        for (role, exp) in iter {
            sum.add(role, &exp);
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(value: f64, error: f64) -> Expectation {
        Expectation { value, error }
    }

    #[test]
    fn sums_by_role_in_quadrature() {
        let sum: YieldSum = vec![
            (Role::Signal, exp(10.0, 1.0)),
            (Role::Background, exp(300.0, 3.0)),
            (Role::Background, exp(100.0, 4.0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(sum.signal, 10.0);
        assert_eq!(sum.signal_var, 1.0);
        assert_eq!(sum.background, 400.0);
        assert_eq!(sum.background_var, 25.0);
        assert_eq!(sum.background_sigma(), 5.0);
        assert_eq!(sum.background_rel_uncertainty(), 5.0 / 400.0);
    }

    #[test]
    fn empty_background_has_nan_relative_uncertainty() {
        let sum: YieldSum = std::iter::once((Role::Signal, exp(1.0, 0.1))).collect();
        assert_eq!(sum.background, 0.0);
        assert!(sum.background_rel_uncertainty().is_nan());
    }
}
