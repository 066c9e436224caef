//! # 声子数缩放的自由能校正
//!
//! Debye 项已经描述了 3 个声学模式，而 neat/KDE 振动能对全部模式求和。
//! 合并两者之前需要把 neat/KDE 项按 `(N - 3) / N` 缩放，避免声学模式重复计数：
//!
//! ```text
//! s = (N - 3) / N    (N > 3)
//!   = 1              (N <= 3)
//!
//! E_without  = neat
//! E_debye    = neat * s + debye
//! E_debye_kde = kde * s + debye
//! ```
//!
//! ## 依赖关系
//! - 被 `ranking/table.rs`, `commands/extract.rs` 使用
//! - 使用 `models/energy.rs`

use crate::models::{CorrectedEnergySet, EnergyVariant, VibrationalTerms};

/// Debye 模型覆盖的声学模式数
pub const ACOUSTIC_MODES: u32 = 3;

/// 计算缩放因子；模式数不超过 3 时不做校正
pub fn scale_factor(phonon_count: u32) -> f64 {
    if phonon_count > ACOUSTIC_MODES {
        (phonon_count - ACOUSTIC_MODES) as f64 / phonon_count as f64
    } else {
        1.0
    }
}

/// 由四个输入量计算校正能量集合
pub fn correct(
    neat_vibrational_energy: f64,
    debye_contribution: f64,
    kde_vibrational_energy: f64,
    phonon_count: u32,
) -> CorrectedEnergySet {
    let s = scale_factor(phonon_count);

    CorrectedEnergySet {
        energy_without_correction: neat_vibrational_energy,
        energy_with_debye: neat_vibrational_energy * s + debye_contribution,
        energy_with_debye_and_kde: kde_vibrational_energy * s + debye_contribution,
        scale_factor: s,
    }
}

/// 四个输入量齐全时计算完整的校正集合
pub fn correct_terms(terms: &VibrationalTerms) -> Option<CorrectedEnergySet> {
    Some(correct(
        terms.neat_vibrational_energy?,
        terms.debye_contribution?,
        terms.kde_vibrational_energy?,
        terms.phonon_count?,
    ))
}

/// 只用该变体所需的输入量计算单个能量值
pub fn variant_energy(terms: &VibrationalTerms, variant: EnergyVariant) -> Option<f64> {
    match variant {
        EnergyVariant::WithoutCorrection => terms.neat_vibrational_energy,
        EnergyVariant::WithDebye => {
            let s = scale_factor(terms.phonon_count?);
            Some(terms.neat_vibrational_energy? * s + terms.debye_contribution?)
        }
        EnergyVariant::WithDebyeAndKde => {
            let s = scale_factor(terms.phonon_count?);
            Some(terms.kde_vibrational_energy? * s + terms.debye_contribution?)
        }
        EnergyVariant::RawKde => terms.kde_vibrational_energy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scenario() {
        let set = correct(100.0, 5.0, 95.0, 10);

        assert!((set.scale_factor - 0.7).abs() < 1e-12);
        assert!((set.energy_without_correction - 100.0).abs() < 1e-12);
        assert!((set.energy_with_debye - 75.0).abs() < 1e-9);
        assert!((set.energy_with_debye_and_kde - 71.5).abs() < 1e-9);
    }

    #[test]
    fn test_scale_factor_strictly_between_zero_and_one() {
        for n in 4..2000 {
            let s = scale_factor(n);
            assert!(s > 0.0 && s < 1.0, "n = {}, s = {}", n, s);
            assert!((s - (n - 3) as f64 / n as f64).abs() < 1e-15);
        }
    }

    #[test]
    fn test_degenerate_phonon_counts_use_unit_scale() {
        for n in 0..=3 {
            assert_eq!(scale_factor(n), 1.0);
        }
        let set = correct(10.0, 1.0, 8.0, 0);
        assert_eq!(set.energy_with_debye, 11.0);
        assert_eq!(set.energy_with_debye_and_kde, 9.0);
    }

    #[test]
    fn test_debye_kde_energy_is_linear() {
        let n = 48;
        let base = correct(0.0, 0.0, 0.0, n).energy_with_debye_and_kde;
        let a = correct(0.0, 2.0, 30.0, n).energy_with_debye_and_kde;
        let b = correct(0.0, -1.5, 12.0, n).energy_with_debye_and_kde;
        let sum = correct(0.0, 0.5, 42.0, n).energy_with_debye_and_kde;

        assert_eq!(base, 0.0);
        assert!((a + b - sum).abs() < 1e-9);
    }

    #[test]
    fn test_variant_energy_needs_only_its_inputs() {
        let terms = VibrationalTerms {
            kde_vibrational_energy: Some(95.0),
            debye_contribution: Some(5.0),
            phonon_count: Some(10),
            ..Default::default()
        };

        let kde = variant_energy(&terms, EnergyVariant::WithDebyeAndKde).unwrap();
        assert!((kde - 71.5).abs() < 1e-9);
        assert_eq!(variant_energy(&terms, EnergyVariant::WithDebye), None);
        assert_eq!(variant_energy(&terms, EnergyVariant::RawKde), Some(95.0));
        assert!(correct_terms(&terms).is_none());
    }
}
