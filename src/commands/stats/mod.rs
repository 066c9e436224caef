//! # stats 子命令模块
//!
//! 包含统计分析子命令的实现：
//! - `kendall`: 排序相关性
//! - `kpoints`: k 点收敛误差
//! - `spread`: 能量极差
//! - `timing`: 计算耗时
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `cli/stats.rs` 定义的参数

pub mod kendall;
pub mod kpoints;
pub mod spread;
pub mod timing;

use crate::cli::stats::{StatsArgs, StatsCommands};
use crate::error::{FreerankError, Result};

use std::fs;
use std::path::Path;

/// 执行 stats 命令（分发到子命令）
pub fn execute(args: StatsArgs) -> Result<()> {
    match args.command {
        StatsCommands::Kendall(args) => kendall::execute(args),
        StatsCommands::Kpoints(args) => kpoints::execute(args),
        StatsCommands::Spread(args) => spread::execute(args),
        StatsCommands::Timing(args) => timing::execute(args),
    }
}

fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| FreerankError::FileWriteError {
        path: dir.display().to_string(),
        source: e,
    })
}
