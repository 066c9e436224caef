//! # 自由能校正与排序模块
//!
//! 提供振动自由能校正、结构排序与排名变化分析。
//!
//! ## 子模块
//! - `correction`: 声子数缩放的自由能校正
//! - `table`: 分组排序表
//! - `change`: 观测结构的排名变化报告
//! - `stats`: Kendall τ、k 点误差等统计
//! - `timing`: 计算耗时汇总
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`

pub mod change;
pub mod correction;
pub mod export;
pub mod stats;
pub mod table;
pub mod timing;

pub use change::{RankChangeReport, RankChangeSummary};
pub use table::GroupRanking;
