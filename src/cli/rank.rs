//! # rank 子命令 CLI 定义
//!
//! 对每个晶体的候选结构按晶格能和校正后自由能分别排序。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs`, `cli/report.rs` 使用
//! - 参数传递给 `commands/rank.rs`

use super::EnergyTerm;

use clap::Args;
use std::path::PathBuf;

/// 晶体目录布局参数（rank 与 report 共用）
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Root directory holding one directory per crystal
    #[arg(env = "FREERANK_CRYSTALS_ROOT")]
    pub root: PathBuf,

    /// Name of the structures table inside each crystal directory
    #[arg(long, default_value = "structures.csv")]
    pub structures_file: String,

    /// Name of the directory holding one sub-directory per structure
    #[arg(long, default_value = "structure-files")]
    pub structure_dir: String,

    /// Free-energy term added to the lattice energy
    #[arg(short, long, value_enum, default_value = "debye-kde")]
    pub term: EnergyTerm,
}

/// rank 子命令参数
#[derive(Args, Debug)]
pub struct RankArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Output directory for <crystal>-ranking.csv files
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Number of top structures to print per crystal
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Rank by lattice energy only structures that also have a free energy
    #[arg(long, default_value_t = false)]
    pub common_only: bool,
}
