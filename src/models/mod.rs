//! # 数据模型模块
//!
//! 定义能量记录、分组键和排序变化的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`ranking/` 和 `commands/` 使用
//! - 子模块: energy, ranking

pub mod energy;
pub mod ranking;

pub use energy::{
    CorrectedEnergySet, EnergyRecord, EnergyVariant, GroupKey, MinimizationInfo, VibrationalTerms,
};
pub use ranking::{ObservedStructure, RankChange, RankClassification};
