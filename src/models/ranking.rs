//! # 排序变化数据模型
//!
//! ## 依赖关系
//! - 被 `ranking/change.rs`, `parsers/observed.rs` 使用
//! - 被 `commands/report.rs` 使用

use serde::{Deserialize, Serialize};

/// 排序变化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankClassification {
    /// 校正后排名上升（delta < 0）
    Improved,
    /// 校正后排名下降（delta > 0）
    Worsened,
    /// 排名不变
    Unchanged,
}

impl RankClassification {
    pub fn from_delta(delta: i64) -> Self {
        match delta.signum() {
            -1 => RankClassification::Improved,
            1 => RankClassification::Worsened,
            _ => RankClassification::Unchanged,
        }
    }
}

impl std::fmt::Display for RankClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankClassification::Improved => write!(f, "improved"),
            RankClassification::Worsened => write!(f, "worsened"),
            RankClassification::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// 单个结构的排名变化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankChange {
    pub id: String,
    pub original_rank: usize,
    pub new_rank: usize,
    /// new_rank - original_rank
    pub delta: i64,
    pub classification: RankClassification,
}

impl RankChange {
    pub fn new(id: impl Into<String>, original_rank: usize, new_rank: usize) -> Self {
        let delta = new_rank as i64 - original_rank as i64;
        RankChange {
            id: id.into(),
            original_rank,
            new_rank,
            delta,
            classification: RankClassification::from_delta(delta),
        }
    }
}

/// 实验观测到的结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedStructure {
    /// CSD refcode
    pub refcode: String,

    /// 对应的 CSP 结构 id
    pub structure_id: String,

    /// 原始搜索中的排名（可能缺失）
    pub observed_rank: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_matches_sign() {
        assert_eq!(RankChange::new("a", 5, 2).classification, RankClassification::Improved);
        assert_eq!(RankChange::new("a", 2, 5).classification, RankClassification::Worsened);
        assert_eq!(RankChange::new("a", 3, 3).classification, RankClassification::Unchanged);
    }

    #[test]
    fn test_delta_is_new_minus_original() {
        let change = RankChange::new("izijoq-QR-2-1566-3", 7, 1);
        assert_eq!(change.delta, -6);
    }
}
