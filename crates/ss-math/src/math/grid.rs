//! Sweep grids and series helpers.

/// Default discriminant thresholds for a cut sweep.
pub const DEFAULT_CUT_VALUES: [f64; 14] = [
    0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.93, 0.96, 0.99, 1.0,
];

/// Default branching-fraction grid bounds (decimal exponents) and size.
pub const DEFAULT_BF_EXP_RANGE: (f64, f64) = (-7.0, -4.0);
pub const DEFAULT_BF_POINTS: usize = 50;

/// Default assumed branching fraction for cut sweeps.
pub const DEFAULT_BRANCHING_FRACTION: f64 = 1e-6;

/// `num` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num)
                .map(|i| {
                    if i == num - 1 {
                        stop
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// `num` values spaced evenly in log10 from `10^start_exp` to `10^stop_exp`.
pub fn logspace(start_exp: f64, stop_exp: f64, num: usize) -> Vec<f64> {
    linspace(start_exp, stop_exp, num)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect()
}

/// The default branching-fraction grid, `logspace(-7, -4, 50)`.
pub fn default_bf_grid() -> Vec<f64> {
    logspace(DEFAULT_BF_EXP_RANGE.0, DEFAULT_BF_EXP_RANGE.1, DEFAULT_BF_POINTS)
}

/// Index of the largest non-NaN value; the first one wins on ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// `(min, max)` of the non-NaN values.
pub fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
