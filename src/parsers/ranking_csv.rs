//! # 排序表读取
//!
//! 读取 `rank` 子命令写出的 `<crystal>-ranking.csv`（只取排名相关列）。
//!
//! ## 依赖关系
//! - 被 `commands/stats/kendall.rs` 使用

use crate::error::{FreerankError, Result};

use serde::Deserialize;
use std::path::Path;

/// 排序表中的一行
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankingRow {
    pub id: String,
    #[serde(rename = "original rank", default, deserialize_with = "csv::invalid_option")]
    pub original_rank: Option<usize>,
    #[serde(rename = "new rank", default, deserialize_with = "csv::invalid_option")]
    pub new_rank: Option<usize>,
}

/// 读取排序表
pub fn read_ranking_csv(path: &Path) -> Result<Vec<RankingRow>> {
    let rdr = csv::Reader::from_path(path)?;
    read_ranking(rdr, &path.display().to_string())
}

pub fn read_ranking<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
    source: &str,
) -> Result<Vec<RankingRow>> {
    let headers = rdr.headers()?.clone();
    for column in ["id", "original rank", "new rank"] {
        if !headers.iter().any(|h| h == column) {
            return Err(FreerankError::MissingColumn {
                column: column.to_string(),
                path: source.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for row in rdr.deserialize::<RankingRow>() {
        rows.push(row?);
    }
    Ok(rows)
}
