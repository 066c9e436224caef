//! # 观测结构列表解析器
//!
//! 解析实验观测结构与 CSP 结构的对应表，例如：
//! ```text
//! Refcode  CSP_Match            Compack_RMSD  Delta_E  Density  Numerical_Rank
//! IZIJOQ   izijoq-QR-2-1566-3   0.21          0.00     1.423    1
//! BEVCEK   None                 None          None     None     None
//! ```
//! 列之间可以是空白或逗号；以 `Refcode` 开头的表头行与空行被跳过，
//! 结构 id 为 `None` 的行被忽略。
//!
//! ## 依赖关系
//! - 被 `commands/report.rs` 使用
//! - 使用 `models/ranking.rs`

use crate::error::{FreerankError, Result};
use crate::models::ObservedStructure;

use std::fs;
use std::path::Path;

/// 解析观测结构文件
pub fn parse_observed_file(path: &Path) -> Result<Vec<ObservedStructure>> {
    let content = fs::read_to_string(path).map_err(|e| FreerankError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(parse_observed_content(&content))
}

/// 从字符串内容解析观测结构
pub fn parse_observed_content(content: &str) -> Vec<ObservedStructure> {
    let mut observed: Vec<ObservedStructure> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("Refcode") || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = if line.contains(',') {
            line.split(',').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };

        if parts.len() < 2 || parts[1].is_empty() || parts[1].contains("None") {
            continue;
        }

        let observed_rank = if parts.len() > 2 {
            parts[parts.len() - 1].parse().ok()
        } else {
            None
        };

        // 同一结构只保留首次出现
        if observed.iter().any(|o| o.structure_id == parts[1]) {
            continue;
        }

        observed.push(ObservedStructure {
            refcode: parts[0].to_string(),
            structure_id: parts[1].to_string(),
            observed_rank,
        });
    }

    observed
}
