//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `ranking/`, `batch/`, `utils/`
//! - 子模块: extract, rank, report, stats, check

pub mod check;
pub mod extract;
pub mod rank;
pub mod report;
pub mod stats;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Extract(args) => extract::execute(args),
        Commands::Rank(args) => rank::execute(args),
        Commands::Report(args) => report::execute(args),
        Commands::Stats(args) => stats::execute(args),
        Commands::Check(args) => check::execute(args),
    }
}
