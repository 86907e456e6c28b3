//! Rendering of scan results.
//!
//! JSON is the primary format: a versioned envelope around the serialized
//! scan. Markdown tables and one-line summaries are for people. Non-finite
//! values serialize as JSON `null` and print as `nan`/`inf` in tables.

use serde::{Deserialize, Serialize};
use ss_common::{RunId, SCHEMA_VERSION};
use ss_config::ConfigSnapshot;
use std::fmt::Write as _;

use crate::sweep::{BranchingFractionScan, EfficiencyScan, SignificanceScan};

/// Result of one sigscan command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanReport {
    Efficiency(EfficiencyScan),
    Significance(SignificanceScan),
    BranchingFraction(BranchingFractionScan),
}

impl ScanReport {
    pub fn command(&self) -> &'static str {
        match self {
            ScanReport::Efficiency(_) => "efficiency",
            ScanReport::Significance(_) => "significance",
            ScanReport::BranchingFraction(_) => "bf-scan",
        }
    }
}

/// JSON document wrapping a report.
pub fn envelope(run_id: &RunId, report: &ScanReport, config: &ConfigSnapshot) -> serde_json::Value {
    serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "run_id": run_id.0,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": report.command(),
        "config": config,
        "result": report,
    })
}

/// Compact number formatting for tables.
pub fn fmt_num(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let a = x.abs();
    if x != 0.0 && !(1e-3..1e5).contains(&a) {
        format!("{:.3e}", x)
    } else {
        format!("{:.4}", x)
    }
}

/// Markdown tables. `yields` switches the significance table to per-sample
/// expected yields.
pub fn render_markdown(report: &ScanReport, yields: bool) -> String {
    match report {
        ScanReport::Efficiency(scan) => efficiency_markdown(scan),
        ScanReport::Significance(scan) if yields => yields_markdown(scan),
        ScanReport::Significance(scan) => significance_markdown(scan),
        ScanReport::BranchingFraction(scan) => bf_markdown(scan),
    }
}

fn efficiency_markdown(scan: &EfficiencyScan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Efficiency vs {} cut", scan.branch);
    let _ = writeln!(out);
    let _ = writeln!(out, "Denominator: {}", denominator_label(scan.denominator.is_raw()));
    let _ = writeln!(out);

    let _ = write!(out, "| cut |");
    for curve in &scan.curves {
        let _ = write!(out, " {} |", curve.title);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "|---|{}", "---|".repeat(scan.curves.len()));

    for (i, cut) in scan.cuts.iter().enumerate() {
        let _ = write!(out, "| {} |", cut);
        for curve in &scan.curves {
            let _ = write!(
                out,
                " {} ± {} |",
                fmt_num(curve.efficiency[i]),
                fmt_num(curve.error[i])
            );
        }
        let _ = writeln!(out);
    }
    out
}

fn significance_markdown(scan: &SignificanceScan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Significance vs {} cut", scan.branch);
    let _ = writeln!(out);
    let _ = writeln!(out, "Branching fraction: {}", fmt_num(scan.branching_fraction));
    let _ = writeln!(out);
    let _ = writeln!(out, "| cut | S | B | S/sqrt(S+B) |");
    let _ = writeln!(out, "|---|---|---|---|");
    for (i, cut) in scan.cuts.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} ± {} | {} |",
            cut,
            fmt_num(scan.signal[i]),
            fmt_num(scan.background[i]),
            fmt_num(scan.background_error[i]),
            fmt_num(scan.significance[i])
        );
    }
    if let Some(best) = scan.optimum {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Best cut: {} (significance {})",
            scan.cuts[best.index],
            fmt_num(best.significance)
        );
    }
    out
}

fn yields_markdown(scan: &SignificanceScan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Expected yields vs {} cut", scan.branch);
    let _ = writeln!(out);
    let _ = writeln!(out, "Branching fraction: {}", fmt_num(scan.branching_fraction));
    let _ = writeln!(out);
    let _ = write!(out, "| cut |");
    for curve in &scan.samples {
        let _ = write!(out, " {} ({}) |", curve.title, curve.role);
    }
    let _ = writeln!(out, " S | B |");
    let _ = writeln!(out, "|---|{}---|---|", "---|".repeat(scan.samples.len()));
    for (i, cut) in scan.cuts.iter().enumerate() {
        let _ = write!(out, "| {} |", cut);
        for curve in &scan.samples {
            let _ = write!(
                out,
                " {} ± {} |",
                fmt_num(curve.expected[i]),
                fmt_num(curve.error[i])
            );
        }
        let _ = writeln!(
            out,
            " {} | {} |",
            fmt_num(scan.signal[i]),
            fmt_num(scan.background[i])
        );
    }
    out
}

fn bf_markdown(scan: &BranchingFractionScan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Significance vs branching fraction");
    let _ = writeln!(out);
    let _ = writeln!(out, "Cut: {}", scan.cut);
    let _ = writeln!(
        out,
        "Relative background uncertainty: {}",
        fmt_num(scan.background_rel_uncertainty)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "| BF | S | B | significance | band | sqrt(S+B)/S |");
    let _ = writeln!(out, "|---|---|---|---|---|---|");
    for (i, bf) in scan.branching_fractions.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | [{}, {}] | {} |",
            fmt_num(*bf),
            fmt_num(scan.signal[i]),
            fmt_num(scan.background[i]),
            fmt_num(scan.significance[i]),
            fmt_num(scan.significance_lower[i]),
            fmt_num(scan.significance_upper[i]),
            fmt_num(scan.uncertainty[i])
        );
    }
    out
}

fn denominator_label(raw: bool) -> &'static str {
    if raw {
        "processed events"
    } else {
        "preselected events"
    }
}

/// One-line summary.
pub fn render_summary(run_id: &RunId, report: &ScanReport) -> String {
    let body = match report {
        ScanReport::Efficiency(scan) => format!(
            "efficiency: {} samples x {} cuts on {}",
            scan.curves.len(),
            scan.cuts.len(),
            scan.branch
        ),
        ScanReport::Significance(scan) => match scan.optimum {
            Some(best) => format!(
                "significance: best {} = {} at {}",
                scan.branch,
                fmt_num(best.significance),
                scan.cuts[best.index]
            ),
            None => format!(
                "significance: no defined point over {} cuts",
                scan.cuts.len()
            ),
        },
        ScanReport::BranchingFraction(scan) => {
            let defined = scan.significance.iter().filter(|z| !z.is_nan()).count();
            format!(
                "bf-scan: {} points ({} defined), sigmaB/B = {}",
                scan.branching_fractions.len(),
                defined,
                fmt_num(scan.background_rel_uncertainty)
            )
        }
    };
    format!("[{}] {}", run_id, body)
}
