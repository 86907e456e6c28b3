//! Cut-sweep drivers.
//!
//! Each driver evaluates the efficiency → expectation → significance chain
//! over a sequence of sweep points and returns parallel series, one entry per
//! point, in the order the points were given. Duplicate points are evaluated
//! twice. A degenerate point (S + B = 0) yields NaN at that point only.

use serde::{Deserialize, Serialize};
use ss_common::{Error, Result, Role};
use ss_config::{AnalysisConfig, SampleSpec};
use ss_math::grid::{argmax, value_range};
use ss_math::{Denominator, Efficiency, Expectation, Significance, YieldSum};
use tracing::{debug, info, warn};

use crate::cut::{threshold_family, Cut};
use crate::source::SelectionSource;

/// A family of threshold cuts on one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSweep {
    pub branch: String,
    pub thresholds: Vec<f64>,
    /// Conjoined to every threshold cut.
    pub extra: Option<Cut>,
}

impl ThresholdSweep {
    pub fn new(branch: impl Into<String>, thresholds: Vec<f64>) -> Self {
        ThresholdSweep {
            branch: branch.into(),
            thresholds,
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: Option<Cut>) -> Self {
        self.extra = extra;
        self
    }

    pub fn cuts(&self) -> Vec<Cut> {
        threshold_family(&self.branch, &self.thresholds, self.extra.as_ref())
    }

    fn validate(&self) -> Result<()> {
        if self.branch.trim().is_empty() {
            return Err(Error::InvalidArgument("sweep branch is empty".to_string()));
        }
        if let Some(bad) = self.thresholds.iter().find(|t| !t.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "cut values must be finite, got {}",
                bad
            )));
        }
        Ok(())
    }
}

/// Options shared by the drivers.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOptions {
    pub denominator: Denominator,
    /// Roles whose samples take part, in any order.
    pub components: Vec<Role>,
    /// Suggested x-axis range; defaults to the span of the swept values.
    pub x_range: Option<(f64, f64)>,
}

impl SweepOptions {
    /// Efficiency curves default to the preselected denominator.
    pub fn efficiency() -> Self {
        SweepOptions {
            denominator: Denominator::Preselected,
            components: Role::ALL.to_vec(),
            x_range: None,
        }
    }

    /// Yield-based scans always start from the processed count.
    pub fn yields() -> Self {
        SweepOptions {
            denominator: Denominator::Processed,
            ..Self::efficiency()
        }
    }

    pub fn with_denominator(mut self, denominator: Denominator) -> Self {
        self.denominator = denominator;
        self
    }

    pub fn with_components(mut self, components: Vec<Role>) -> Self {
        if !components.is_empty() {
            self.components = components;
        }
        self
    }

    pub fn with_x_range(mut self, x_range: Option<(f64, f64)>) -> Self {
        self.x_range = x_range;
        self
    }

    fn includes(&self, role: Role) -> bool {
        self.components.contains(&role)
    }

    fn range_for(&self, values: &[f64]) -> Option<(f64, f64)> {
        self.x_range.or_else(|| value_range(values))
    }
}

/// Efficiency curve of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyCurve {
    pub sample: String,
    pub title: String,
    pub role: Role,
    pub efficiency: Vec<f64>,
    pub error: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyScan {
    pub branch: String,
    pub thresholds: Vec<f64>,
    pub cuts: Vec<String>,
    pub denominator: Denominator,
    pub x_range: Option<(f64, f64)>,
    pub curves: Vec<EfficiencyCurve>,
}

/// Expected yield of one sample over a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldCurve {
    pub sample: String,
    pub title: String,
    pub role: Role,
    pub expected: Vec<f64>,
    pub error: Vec<f64>,
}

/// Best point of a significance scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Optimum {
    pub index: usize,
    pub threshold: f64,
    pub significance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceScan {
    pub branch: String,
    pub thresholds: Vec<f64>,
    pub cuts: Vec<String>,
    pub branching_fraction: f64,
    pub denominator: Denominator,
    pub x_range: Option<(f64, f64)>,
    pub samples: Vec<YieldCurve>,
    pub signal: Vec<f64>,
    pub signal_error: Vec<f64>,
    pub background: Vec<f64>,
    pub background_error: Vec<f64>,
    pub significance: Vec<f64>,
    pub optimum: Option<Optimum>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchingFractionScan {
    pub cut: String,
    pub branching_fractions: Vec<f64>,
    pub denominator: Denominator,
    pub x_range: Option<(f64, f64)>,
    pub signal: Vec<f64>,
    pub background: Vec<f64>,
    pub background_error: Vec<f64>,
    /// σB / B; constant across the scan.
    pub background_rel_uncertainty: f64,
    pub significance: Vec<f64>,
    pub significance_lower: Vec<f64>,
    pub significance_upper: Vec<f64>,
    pub uncertainty: Vec<f64>,
    pub uncertainty_lower: Vec<f64>,
    pub uncertainty_upper: Vec<f64>,
}

fn participants<'a>(config: &'a AnalysisConfig, options: &SweepOptions) -> Vec<&'a SampleSpec> {
    config
        .samples
        .iter()
        .filter(|s| options.includes(s.role))
        .collect()
}

fn check_branching_fraction(bf: f64) -> Result<()> {
    if !bf.is_finite() || bf < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "branching fraction must be finite and non-negative, got {}",
            bf
        )));
    }
    Ok(())
}

/// Efficiency of every participating sample for every cut of `sweep`.
pub fn efficiency_scan(
    config: &AnalysisConfig,
    source: &dyn SelectionSource,
    sweep: &ThresholdSweep,
    options: &SweepOptions,
) -> Result<EfficiencyScan> {
    sweep.validate()?;
    let cuts = sweep.cuts();

    let mut curves = Vec::new();
    for sample in participants(config, options) {
        let mut efficiency = Vec::with_capacity(cuts.len());
        let mut error = Vec::with_capacity(cuts.len());
        for cut in &cuts {
            let eff = source.efficiency(&sample.name, cut, options.denominator)?;
            debug!(sample = %sample.name, cut = %cut, eff = eff.value, err = eff.error, "efficiency");
            efficiency.push(eff.value);
            error.push(eff.error);
        }
        curves.push(EfficiencyCurve {
            sample: sample.name.clone(),
            title: sample.title().to_string(),
            role: sample.role,
            efficiency,
            error,
        });
    }

    info!(
        branch = %sweep.branch,
        points = cuts.len(),
        samples = curves.len(),
        "efficiency scan complete"
    );

    Ok(EfficiencyScan {
        branch: sweep.branch.clone(),
        thresholds: sweep.thresholds.clone(),
        cuts: cuts.iter().map(Cut::to_string).collect(),
        denominator: options.denominator,
        x_range: options.range_for(&sweep.thresholds),
        curves,
    })
}

/// Expected yields, S, B and significance over a threshold sweep at a
/// single branching fraction.
pub fn significance_scan(
    config: &AnalysisConfig,
    source: &dyn SelectionSource,
    sweep: &ThresholdSweep,
    branching_fraction: f64,
    options: &SweepOptions,
) -> Result<SignificanceScan> {
    sweep.validate()?;
    check_branching_fraction(branching_fraction)?;
    let cuts = sweep.cuts();
    let members = participants(config, options);

    let mut samples: Vec<YieldCurve> = members
        .iter()
        .map(|s| YieldCurve {
            sample: s.name.clone(),
            title: s.title().to_string(),
            role: s.role,
            expected: Vec::with_capacity(cuts.len()),
            error: Vec::with_capacity(cuts.len()),
        })
        .collect();

    let mut signal = Vec::with_capacity(cuts.len());
    let mut signal_error = Vec::with_capacity(cuts.len());
    let mut background = Vec::with_capacity(cuts.len());
    let mut background_error = Vec::with_capacity(cuts.len());
    let mut significance = Vec::with_capacity(cuts.len());

    for cut in &cuts {
        let mut sum = YieldSum::new();
        for (spec, curve) in members.iter().zip(samples.iter_mut()) {
            let eff = source.efficiency(&spec.name, cut, options.denominator)?;
            let exp = Expectation::scale(
                &eff,
                &config.normalization(spec),
                spec.role,
                branching_fraction,
            );
            sum.add(spec.role, &exp);
            curve.expected.push(exp.value);
            curve.error.push(exp.error);
        }

        let sig = Significance::from_yields(&sum);
        if !sig.is_defined() {
            warn!(cut = %cut, s = sum.signal, b = sum.background, "significance undefined");
        }
        debug!(cut = %cut, s = sum.signal, b = sum.background, significance = sig.value, "point");

        signal.push(sum.signal);
        signal_error.push(sum.signal_sigma());
        background.push(sum.background);
        background_error.push(sum.background_sigma());
        significance.push(sig.value);
    }

    let optimum = argmax(&significance).map(|index| Optimum {
        index,
        threshold: sweep.thresholds[index],
        significance: significance[index],
    });
    if let Some(best) = optimum {
        info!(
            branch = %sweep.branch,
            threshold = best.threshold,
            significance = best.significance,
            "best cut"
        );
    }

    Ok(SignificanceScan {
        branch: sweep.branch.clone(),
        thresholds: sweep.thresholds.clone(),
        cuts: cuts.iter().map(Cut::to_string).collect(),
        branching_fraction,
        denominator: options.denominator,
        x_range: options.range_for(&sweep.thresholds),
        samples,
        signal,
        signal_error,
        background,
        background_error,
        significance,
        optimum,
    })
}

/// Significance and its band for one cut over a grid of branching fractions.
pub fn bf_scan(
    config: &AnalysisConfig,
    source: &dyn SelectionSource,
    cut: &Cut,
    branching_fractions: &[f64],
    options: &SweepOptions,
) -> Result<BranchingFractionScan> {
    for &bf in branching_fractions {
        check_branching_fraction(bf)?;
    }

    // Efficiencies do not depend on the branching fraction.
    let mut efficiencies: Vec<(&SampleSpec, Efficiency)> = Vec::new();
    for spec in participants(config, options) {
        let eff = source.efficiency(&spec.name, cut, options.denominator)?;
        efficiencies.push((spec, eff));
    }

    let n = branching_fractions.len();
    let mut scan = BranchingFractionScan {
        cut: cut.to_string(),
        branching_fractions: branching_fractions.to_vec(),
        denominator: options.denominator,
        x_range: options.range_for(branching_fractions),
        signal: Vec::with_capacity(n),
        background: Vec::with_capacity(n),
        background_error: Vec::with_capacity(n),
        background_rel_uncertainty: f64::NAN,
        significance: Vec::with_capacity(n),
        significance_lower: Vec::with_capacity(n),
        significance_upper: Vec::with_capacity(n),
        uncertainty: Vec::with_capacity(n),
        uncertainty_lower: Vec::with_capacity(n),
        uncertainty_upper: Vec::with_capacity(n),
    };

    for &bf in branching_fractions {
        let sum: YieldSum = efficiencies
            .iter()
            .map(|(spec, eff)| {
                let norm = config.normalization(spec);
                (spec.role, Expectation::scale(eff, &norm, spec.role, bf))
            })
            .collect();
        let sig = Significance::from_yields(&sum);

        scan.background_rel_uncertainty = sum.background_rel_uncertainty();
        scan.signal.push(sum.signal);
        scan.background.push(sum.background);
        scan.background_error.push(sum.background_sigma());
        scan.significance.push(sig.value);
        scan.significance_lower.push(sig.lower);
        scan.significance_upper.push(sig.upper);
        scan.uncertainty.push(sig.uncertainty);
        scan.uncertainty_lower.push(sig.uncertainty_lower);
        scan.uncertainty_upper.push(sig.uncertainty_upper);
    }

    debug!(
        cut = %scan.cut,
        rel_bkg_unc = scan.background_rel_uncertainty,
        "relative background uncertainty"
    );
    info!(cut = %scan.cut, points = n, "branching fraction scan complete");

    Ok(scan)
}
