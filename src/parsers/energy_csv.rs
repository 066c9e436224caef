//! # 合并能量表
//!
//! `extract` 子命令写出、`stats` 子命令读入的 CSV 行格式。
//! 缺失的值写为空单元格。
//!
//! ## 依赖关系
//! - 被 `ranking/export.rs`, `commands/extract.rs`, `commands/stats/` 使用
//! - 使用 `models/energy.rs`

use crate::error::{FreerankError, Result};
use crate::models::{CorrectedEnergySet, EnergyVariant, GroupKey, VibrationalTerms};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 合并能量表中的一行（一个报告文件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySampleRow {
    pub crystal: String,
    #[serde(default)]
    pub polymorph: Option<String>,
    pub k_point: f64,
    #[serde(default)]
    pub file: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub neat_vibrational_energy: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub debye_contribution: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub kde_vibrational_energy: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub phonon_count: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub sampled_k_points: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub scale_factor: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub energy_without_correction: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub energy_with_debye: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub energy_with_debye_and_kde: Option<f64>,
}

impl EnergySampleRow {
    pub fn new(
        group: &GroupKey,
        k_point: f64,
        file: impl Into<String>,
        terms: &VibrationalTerms,
        corrected: Option<&CorrectedEnergySet>,
    ) -> Self {
        EnergySampleRow {
            crystal: group.crystal.clone(),
            polymorph: group.polymorph.clone(),
            k_point,
            file: file.into(),
            neat_vibrational_energy: terms.neat_vibrational_energy,
            debye_contribution: terms.debye_contribution,
            kde_vibrational_energy: terms.kde_vibrational_energy,
            phonon_count: terms.phonon_count,
            sampled_k_points: terms.sampled_k_points,
            scale_factor: corrected.map(|c| c.scale_factor),
            energy_without_correction: corrected
                .map(|c| c.energy_without_correction)
                .or(terms.neat_vibrational_energy),
            energy_with_debye: corrected.map(|c| c.energy_with_debye),
            energy_with_debye_and_kde: corrected.map(|c| c.energy_with_debye_and_kde),
        }
    }

    pub fn group(&self) -> GroupKey {
        GroupKey {
            crystal: self.crystal.clone(),
            polymorph: self.polymorph.clone(),
        }
    }

    /// 按变体取能量
    pub fn energy(&self, variant: EnergyVariant) -> Option<f64> {
        match variant {
            EnergyVariant::WithoutCorrection => self.energy_without_correction,
            EnergyVariant::WithDebye => self.energy_with_debye,
            EnergyVariant::WithDebyeAndKde => self.energy_with_debye_and_kde,
            EnergyVariant::RawKde => self.kde_vibrational_energy,
        }
    }
}

/// 读取合并能量表，返回 (有效行, 跳过的行)
pub fn read_energy_csv(path: &Path) -> Result<(Vec<EnergySampleRow>, Vec<(usize, String)>)> {
    if !path.exists() {
        return Err(FreerankError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut rdr = csv::Reader::from_path(path)?;
    let headers = rdr.headers()?.clone();
    for column in ["crystal", "k_point"] {
        if !headers.iter().any(|h| h == column) {
            return Err(FreerankError::MissingColumn {
                column: column.to_string(),
                path: path.display().to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    for (idx, row) in rdr.deserialize::<EnergySampleRow>().enumerate() {
        match row {
            Ok(r) => rows.push(r),
            Err(e) => skipped.push((idx + 1, e.to_string())),
        }
    }

    Ok((rows, skipped))
}
