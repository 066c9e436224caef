//! # 解析器模块
//!
//! 提供模拟报告文本和各类 CSV/文本表格的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: autofree_out, timing, structures, observed, naming, energy_csv, ranking_csv

pub mod autofree_out;
pub mod energy_csv;
pub mod naming;
pub mod observed;
pub mod ranking_csv;
pub mod structures;
pub mod timing;

pub use autofree_out::{parse_report_file, ParseDiagnostic};
pub use energy_csv::EnergySampleRow;
pub use naming::{sample_key_from_path, timing_key_from_path};
