//! Property-based tests for ss-math.
//!
//! Uses proptest to verify the efficiency → expectation → significance
//! arithmetic across many random inputs.

use proptest::prelude::*;
use ss_common::Role;
use ss_math::{
    grid, significance, Efficiency, Expectation, Normalization, Significance, YieldSum,
};

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-10;

/// Helper to check approximate equality (relative for large magnitudes).
fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

// ============================================================================
// Efficiency properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Efficiency is always inside [0, 1], whatever the counts.
    #[test]
    fn efficiency_bounded(k in -1e9..1e9f64, n in -1e9..1e9f64) {
        let eff = Efficiency::from_counts(k, n);
        prop_assert!((0.0..=1.0).contains(&eff.value), "eff({}, {}) = {}", k, n, eff.value);
        prop_assert!(eff.error >= 0.0);
        prop_assert!(eff.error.is_finite());
    }

    /// Binomial error never exceeds the maximum sqrt(0.25 / N).
    #[test]
    fn efficiency_error_bounded(k in 0.0..1e6f64, extra in 0.0..1e6f64) {
        let n = k + extra;
        prop_assume!(n > 0.0);
        let eff = Efficiency::from_counts(k, n);
        prop_assert!(eff.error <= (0.25 / n).sqrt() + TOL);
    }

    /// Selecting more events never lowers the efficiency.
    #[test]
    fn efficiency_monotone_in_selected(k1 in 0.0..1e6f64, dk in 0.0..1e6f64, n in 1.0..3e6f64) {
        let lo = Efficiency::from_counts(k1, n);
        let hi = Efficiency::from_counts(k1 + dk, n);
        prop_assert!(hi.value >= lo.value);
    }
}

// ============================================================================
// Expectation properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Signal expectation is linear in the branching fraction.
    #[test]
    fn signal_linear_in_bf(
        k in 0.0..1e5f64,
        n in 1.0..1e6f64,
        xs in 0.0..1e4f64,
        lumi in 0.0..1e9f64,
        bf in 0.0..1e-2f64,
    ) {
        let eff = Efficiency::from_counts(k, n);
        let norm = Normalization::new(xs, lumi);
        let one = Expectation::scale(&eff, &norm, Role::Signal, bf);
        let two = Expectation::scale(&eff, &norm, Role::Signal, 2.0 * bf);
        prop_assert!(approx_eq(two.value, 2.0 * one.value, TOL));
        prop_assert!(approx_eq(two.error, 2.0 * one.error, TOL));
        prop_assert!(one.value >= 0.0);
    }

    /// Background expectation does not depend on the branching fraction.
    #[test]
    fn background_constant_in_bf(
        k in 0.0..1e5f64,
        n in 1.0..1e6f64,
        xs in 0.0..1e4f64,
        bf1 in 0.0..1.0f64,
        bf2 in 0.0..1.0f64,
    ) {
        let eff = Efficiency::from_counts(k, n);
        let norm = Normalization::new(xs, 1.5e8);
        let a = Expectation::scale(&eff, &norm, Role::Background, bf1);
        let b = Expectation::scale(&eff, &norm, Role::Background, bf2);
        prop_assert_eq!(a, b);
    }
}

// ============================================================================
// Significance properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Scaling S and B by k scales the significance by sqrt(k), not 1.
    #[test]
    fn significance_scales_with_sqrt_k(s in 1.0..1e6f64, b in 0.0..1e6f64, k in 1.5..100.0f64) {
        let base = significance(s, b);
        let scaled = significance(k * s, k * b);
        prop_assert!(approx_eq(scaled, k.sqrt() * base, 1e-9));
        prop_assert!(scaled > base);
    }

    /// The band always brackets the nominal value when it is defined.
    #[test]
    fn band_brackets_nominal(s in 1.0..1e6f64, b in 0.0..1e6f64, frac in 0.0..0.99f64) {
        let sigma_b = frac * b;
        let sig = Significance::compute(s, b, sigma_b);
        prop_assert!(sig.lower <= sig.value + TOL);
        prop_assert!(sig.value <= sig.upper + TOL);
        prop_assert!(sig.uncertainty_lower <= sig.uncertainty + TOL);
        prop_assert!(sig.uncertainty <= sig.uncertainty_upper + TOL);
    }

    /// Significance is bounded by sqrt(S).
    #[test]
    fn significance_at_most_sqrt_s(s in 0.0..1e8f64, b in 0.0..1e8f64) {
        prop_assume!(s + b > 0.0);
        prop_assert!(significance(s, b) <= s.sqrt() + TOL);
    }

    /// Quadrature sum of background errors matches the direct formula.
    #[test]
    fn background_sigma_quadrature(e1 in 0.0..1e3f64, e2 in 0.0..1e3f64, e3 in 0.0..1e3f64) {
        let sum: YieldSum = [e1, e2, e3]
            .iter()
            .map(|&e| (Role::Background, Expectation { value: 1.0, error: e }))
            .collect();
        let direct = (e1 * e1 + e2 * e2 + e3 * e3).sqrt();
        prop_assert!(approx_eq(sum.background_sigma(), direct, TOL));
    }
}

// ============================================================================
// Fixed reference points
// ============================================================================

#[test]
fn significance_reference_points() {
    assert!(approx_eq(significance(100.0, 400.0), 100.0 / 500f64.sqrt(), TOL));
    assert!((significance(100.0, 400.0) - 4.47).abs() < 0.01);
    assert_eq!(significance(0.0, 100.0), 0.0);
    assert_eq!(significance(100.0, 0.0), 10.0);
    assert!(significance(0.0, 0.0).is_nan());
}

#[test]
fn full_pipeline_reference() {
    // 1e6 processed signal events, 30% survive; sigma*L = 2e8 produced.
    let eff = Efficiency::from_counts(3e5, 1e6);
    let norm = Normalization::new(2.0, 1e8);
    let sig = Expectation::scale(&eff, &norm, Role::Signal, 1e-6);
    assert!(approx_eq(sig.value, 60.0, TOL));

    let bkg_eff = Efficiency::from_counts(2.0, 1e7);
    let bkg_norm = Normalization::new(10.0, 1e8);
    let bkg = Expectation::scale(&bkg_eff, &bkg_norm, Role::Background, 1e-6);
    assert!(approx_eq(bkg.value, 200.0, TOL));

    let sum: YieldSum = vec![(Role::Signal, sig), (Role::Background, bkg)]
        .into_iter()
        .collect();
    let result = Significance::from_yields(&sum);
    assert!(approx_eq(result.value, 60.0 / 260f64.sqrt(), TOL));
    assert!(result.lower < result.value);
}

#[test]
fn default_grid_optimum_is_last_for_increasing_series() {
    let series: Vec<f64> = grid::default_bf_grid()
        .iter()
        .map(|bf| significance(bf * 1e8, 100.0))
        .collect();
    assert_eq!(grid::argmax(&series), Some(series.len() - 1));
}
