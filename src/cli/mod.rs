//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `extract`: 解析自由能报告并合并为能量表
//! - `rank`: 计算原始/校正后排序
//! - `report`: 观测结构的排名变化报告
//! - `stats`: 统计分析（嵌套子命令）
//!   - `kendall`: 排序相关性
//!   - `kpoints`: k 点收敛误差
//!   - `spread`: 能量随 k 点的极差
//!   - `timing`: 各 k 值的计算耗时
//! - `check`: 检查计算目录完整性
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: extract, rank, report, stats, check

pub mod check;
pub mod extract;
pub mod rank;
pub mod report;
pub mod stats;

use crate::models::EnergyVariant;

use clap::{Parser, Subcommand, ValueEnum};

/// freerank - 晶体结构自由能校正与重排序工具
#[derive(Parser)]
#[command(name = "freerank")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Free-energy correction and re-ranking of predicted crystal structures",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Parse free-energy reports and write a combined energy CSV
    Extract(extract::ExtractArgs),

    /// Rank structures by lattice energy and by corrected free energy
    Rank(rank::RankArgs),

    /// Report rank changes of experimentally observed structures
    Report(report::ReportArgs),

    /// Statistics over rankings and k-point samples
    Stats(stats::StatsArgs),

    /// Check calculation directories for missing or duplicate reports
    Check(check::CheckArgs),
}

/// 用于排序的自由能项
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum EnergyTerm {
    /// Scaled neat vibrational energy
    Neat,
    /// Scaled neat vibrational energy plus Debye contribution
    Debye,
    /// Scaled KDE vibrational energy plus Debye contribution
    #[default]
    DebyeKde,
    /// Unscaled KDE vibrational energy
    Kde,
}

impl EnergyTerm {
    pub fn variant(self) -> EnergyVariant {
        match self {
            EnergyTerm::Neat => EnergyVariant::WithoutCorrection,
            EnergyTerm::Debye => EnergyVariant::WithDebye,
            EnergyTerm::DebyeKde => EnergyVariant::WithDebyeAndKde,
            EnergyTerm::Kde => EnergyVariant::RawKde,
        }
    }
}

impl std::fmt::Display for EnergyTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnergyTerm::Neat => write!(f, "neat"),
            EnergyTerm::Debye => write!(f, "debye"),
            EnergyTerm::DebyeKde => write!(f, "debye-kde"),
            EnergyTerm::Kde => write!(f, "kde"),
        }
    }
}
