//! # report 子命令 CLI 定义
//!
//! 观测结构在校正前后的排名变化报告。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/report.rs`

use super::rank::LayoutArgs;

use clap::Args;
use std::path::PathBuf;

/// report 子命令参数
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// File listing observed structures (refcode, structure id, ..., rank)
    #[arg(long)]
    pub observed: PathBuf,

    /// Text summary output
    #[arg(long, default_value = "rank_changes.txt")]
    pub summary: PathBuf,

    /// CSV output
    #[arg(short, long, default_value = "rank_changes.csv")]
    pub output: PathBuf,
}
