//! # extract 子命令 CLI 定义
//!
//! 批量解析自由能报告 (.out)，输出合并的能量 CSV。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/extract.rs`

use clap::Args;
use std::path::PathBuf;

/// extract 子命令参数
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Input: a report file or a directory containing reports
    pub input: PathBuf,

    /// Output CSV file
    #[arg(short, long, default_value = "energies.csv")]
    pub output: PathBuf,

    /// Glob pattern for report files (comma separated)
    #[arg(short, long, default_value = "*.out")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of failures to list in the summary
    #[arg(long, default_value_t = 5)]
    pub show_failures: usize,
}
