//! # 能量记录数据模型
//!
//! 单个候选晶体结构的模拟结果，以及由其派生的自由能校正结果。
//!
//! ## 依赖关系
//! - 被 `parsers/autofree_out.rs`, `parsers/structures.rs` 使用
//! - 被 `ranking/` 和 `commands/` 使用

use serde::{Deserialize, Serialize};

/// 晶体/多晶型分组键
///
/// 一个排序表只在同一分组内比较能量。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub crystal: String,
    pub polymorph: Option<String>,
}

impl GroupKey {
    pub fn crystal(crystal: impl Into<String>) -> Self {
        GroupKey {
            crystal: crystal.into(),
            polymorph: None,
        }
    }

    pub fn polymorph(crystal: impl Into<String>, polymorph: impl Into<String>) -> Self {
        GroupKey {
            crystal: crystal.into(),
            polymorph: Some(polymorph.into()),
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.polymorph {
            Some(p) => write!(f, "{}_{}", self.crystal, p),
            None => write!(f, "{}", self.crystal),
        }
    }
}

/// 从报告文本中提取的振动项（各字段均可能缺失）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VibrationalTerms {
    /// 全部模式求和的振动能 (kJ/mol)
    pub neat_vibrational_energy: Option<f64>,

    /// Debye 模型给出的 3 个声学模式贡献 (kJ/mol)
    pub debye_contribution: Option<f64>,

    /// Epanechnikov KDE 积分的振动能 (kJ/mol)
    pub kde_vibrational_energy: Option<f64>,

    /// 计入的振动模式总数
    pub phonon_count: Option<u32>,

    /// 采样的不等价 k 点数
    pub sampled_k_points: Option<u32>,
}

impl VibrationalTerms {
    /// 是否一个字段都没有解析到
    pub fn is_empty(&self) -> bool {
        self.neat_vibrational_energy.is_none()
            && self.debye_contribution.is_none()
            && self.kde_vibrational_energy.is_none()
            && self.phonon_count.is_none()
            && self.sampled_k_points.is_none()
    }
}

/// 自由能校正变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyVariant {
    /// 未校正的 neat 振动能
    WithoutCorrection,
    /// 缩放后的 neat 振动能 + Debye 项
    WithDebye,
    /// 缩放后的 KDE 振动能 + Debye 项
    WithDebyeAndKde,
    /// 原始 KDE 振动能，不做缩放
    RawKde,
}

impl std::fmt::Display for EnergyVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnergyVariant::WithoutCorrection => write!(f, "Energy without Debye or KDE"),
            EnergyVariant::WithDebye => write!(f, "Energy with only Debye"),
            EnergyVariant::WithDebyeAndKde => write!(f, "Energy with Debye and KDE"),
            EnergyVariant::RawKde => write!(f, "Epanechnikov KDE vibrational energy"),
        }
    }
}

/// 由一条记录计算出的三种能量（不可变）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectedEnergySet {
    pub energy_without_correction: f64,
    pub energy_with_debye: f64,
    pub energy_with_debye_and_kde: f64,
    pub scale_factor: f64,
}

/// structures 表中透传的最小化元数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinimizationInfo {
    pub minimization_step: Option<String>,
    pub trial_number: Option<String>,
    pub minimization_time: Option<String>,
}

/// 单个候选结构的能量记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    /// 结构标识（组内唯一）
    pub id: String,

    /// 静态最小化晶格能 (kJ/mol)
    pub lattice_energy: f64,

    /// 振动项
    pub terms: VibrationalTerms,

    /// 密度 (g/cm³)
    pub density: Option<f64>,

    /// 空间群
    pub spacegroup: Option<String>,

    pub minimization: MinimizationInfo,
}

impl EnergyRecord {
    pub fn new(id: impl Into<String>, lattice_energy: f64) -> Self {
        EnergyRecord {
            id: id.into(),
            lattice_energy,
            terms: VibrationalTerms::default(),
            density: None,
            spacegroup: None,
            minimization: MinimizationInfo::default(),
        }
    }

    #[cfg(test)]
    pub fn with_terms(mut self, terms: VibrationalTerms) -> Self {
        self.terms = terms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_display() {
        assert_eq!(GroupKey::crystal("izijoq").to_string(), "izijoq");
        assert_eq!(
            GroupKey::polymorph("cumjoj", "form2").to_string(),
            "cumjoj_form2"
        );
    }

    #[test]
    fn test_terms_is_empty() {
        let mut terms = VibrationalTerms::default();
        assert!(terms.is_empty());
        terms.sampled_k_points = Some(12);
        assert!(!terms.is_empty());
    }
}
