//! # freerank - 晶体结构自由能校正与重排序
//!
//! 读取晶格动力学模拟报告中的振动自由能项，按声子数缩放校正后
//! 加到晶格能上，对预测的晶体结构重新排序，并评估实验观测结构的排名变化。
//!
//! ## 子命令
//! - `extract` - 解析报告并写出合并能量表
//! - `rank`    - 原始/校正后排序
//! - `report`  - 观测结构排名变化
//! - `stats`   - 统计分析
//!   - `kendall` - 排序相关性
//!   - `kpoints` - k 点收敛误差
//!   - `spread`  - 能量极差
//!   - `timing`  - 计算耗时
//! - `check`   - 检查计算目录
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (报告与表格解析器)
//!   │     ├── ranking/   (校正、排序、统计、导出)
//!   │     ├── batch/     (文件收集与批处理)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod ranking;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
