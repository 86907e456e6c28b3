//! Built-in configuration for the FCC-ee B_s → νν̄ study at the Z pole.
//!
//! Signal is normalized to σ(Z → bb̄) · 2 · f(B_s) so that the assumed
//! branching fraction is the only remaining factor. Backgrounds are the
//! inclusive hadronic Z decays.

use ss_common::Role;
use std::collections::BTreeMap;

use crate::analysis::{AnalysisConfig, SampleSpec, SweepDefaults};
use crate::CONFIG_SCHEMA_VERSION;

/// 150 ab⁻¹ in pb⁻¹.
pub const TERA_Z_LUMINOSITY_PB: f64 = 1.5e8;

const SIGMA_ZBB_PB: f64 = 6645.46;
const SIGMA_ZCC_PB: f64 = 5215.46;
const SIGMA_ZUDS_PB: f64 = 18616.5;
const F_BS: f64 = 0.101;

/// Discriminants of the two-stage BDT selection.
pub const MVA1_BRANCH: &str = "EVT_MVA1";
pub const MVA2_BRANCH: &str = "EVT_MVA2";

/// Name of the default working point.
pub const WP1: &str = "wp1";

/// The built-in analysis configuration.
pub fn builtin() -> AnalysisConfig {
    let samples = vec![
        sample(
            "p8_ee_Zbb_ecm91_EvtGen_Bs2NuNu",
            "B_s^0 → νν̄",
            Role::Signal,
            SIGMA_ZBB_PB * 2.0 * F_BS,
        ),
        sample("p8_ee_Zbb_ecm91", "Z → bb̄", Role::Background, SIGMA_ZBB_PB),
        sample("p8_ee_Zcc_ecm91", "Z → cc̄", Role::Background, SIGMA_ZCC_PB),
        sample("p8_ee_Zuds_ecm91", "Z → uds", Role::Background, SIGMA_ZUDS_PB),
    ];

    let mut working_points = BTreeMap::new();
    working_points.insert(
        WP1.to_string(),
        vec![
            format!("{} > 0.994", MVA1_BRANCH),
            format!("{} > 0.95", MVA2_BRANCH),
        ],
    );

    AnalysisConfig {
        schema_version: CONFIG_SCHEMA_VERSION.to_string(),
        description: Some("FCC-ee B_s -> nu nubar sensitivity study (built-in)".to_string()),
        luminosity_pb: TERA_Z_LUMINOSITY_PB,
        samples,
        working_points,
        sweep: SweepDefaults {
            branch: Some(MVA1_BRANCH.to_string()),
            working_point: Some(WP1.to_string()),
            ..SweepDefaults::default()
        },
    }
}

fn sample(name: &str, title: &str, role: Role, cross_section_pb: f64) -> SampleSpec {
    SampleSpec {
        name: name.to_string(),
        title: Some(title.to_string()),
        role,
        cross_section_pb,
        lumi_scale: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_analysis;

    #[test]
    fn builtin_is_valid() {
        validate_analysis(&builtin()).expect("built-in config must validate");
    }

    #[test]
    fn builtin_has_one_signal_and_three_backgrounds() {
        let config = builtin();
        assert_eq!(config.samples_with_role(Role::Signal).count(), 1);
        assert_eq!(config.samples_with_role(Role::Background).count(), 3);
    }

    #[test]
    fn builtin_wp1() {
        let config = builtin();
        assert_eq!(
            config.working_point(WP1).unwrap(),
            &["EVT_MVA1 > 0.994".to_string(), "EVT_MVA2 > 0.95".to_string()]
        );
    }
}
