//! # check 子命令 CLI 定义
//!
//! 检查计算目录中报告文件的数量。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/check.rs`

use clap::Args;
use std::path::PathBuf;

/// check 子命令参数
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Root directory to scan
    pub root: PathBuf,

    /// Name of the directory holding one sub-directory per structure
    #[arg(long, default_value = "structure-files")]
    pub structure_dir: String,
}
