//! # stats 子命令 CLI 定义
//!
//! 统计分析统一入口，包含多个子命令：
//! - `kendall`: 原始与新排序之间的 Kendall τ
//! - `kpoints`: 多晶型能量差随 k 点的收敛误差
//! - `spread`: 各能量项在 k 点间的极差
//! - `timing`: 各 k 值的计算耗时
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/stats/` 相应模块

use clap::{Args, Subcommand};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Stats 主命令
// ─────────────────────────────────────────────────────────────

/// stats 主命令参数
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommands,
}

/// stats 子命令
#[derive(Subcommand, Debug)]
pub enum StatsCommands {
    /// Kendall tau-b between original and new ranks of each ranking CSV
    Kendall(KendallArgs),

    /// Polymorph energy-difference errors relative to a reference k-point
    Kpoints(KpointsArgs),

    /// Highest/lowest energy across k-points for each energy term
    Spread(SpreadArgs),

    /// Run time per k-point spacing from DMACRYS timing tables
    Timing(TimingArgs),
}

// ─────────────────────────────────────────────────────────────
// Kendall τ
// ─────────────────────────────────────────────────────────────

/// kendall 子命令参数
#[derive(Args, Debug)]
pub struct KendallArgs {
    /// Directory containing <crystal>-ranking.csv files
    pub input: PathBuf,

    /// Output CSV file
    #[arg(short, long, default_value = "kendall_tau.csv")]
    pub output: PathBuf,

    /// Glob pattern for ranking files
    #[arg(short, long, default_value = "*-ranking.csv")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,
}

// ─────────────────────────────────────────────────────────────
// k 点误差
// ─────────────────────────────────────────────────────────────

/// kpoints 子命令参数
#[derive(Args, Debug)]
pub struct KpointsArgs {
    /// Combined energy CSV written by `extract`
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Reference k-point spacing
    #[arg(long, default_value_t = 0.10)]
    pub reference_k: f64,
}

// ─────────────────────────────────────────────────────────────
// 能量极差
// ─────────────────────────────────────────────────────────────

/// spread 子命令参数
#[derive(Args, Debug)]
pub struct SpreadArgs {
    /// Combined energy CSV written by `extract`
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

// ─────────────────────────────────────────────────────────────
// 计算耗时
// ─────────────────────────────────────────────────────────────

/// timing 子命令参数
#[derive(Args, Debug)]
pub struct TimingArgs {
    /// Root directory laid out as <crystal>/<polymorph>/.../<k-value dir>/
    pub input: PathBuf,

    /// Combined energy CSV written by `extract`, for sampled k-point counts
    #[arg(short, long)]
    pub energies: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Glob pattern for timing files
    #[arg(short, long, default_value = "*.dmaout")]
    pub pattern: String,
}
