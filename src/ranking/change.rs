//! # 排名变化报告
//!
//! 比较同一分组的原始排序与校正后排序，针对实验观测结构给出排名变化。
//!
//! ## 规则
//! - 观测 id 同时出现在两张表中：生成 `RankChange`
//! - 任一表中缺失：计入 "not found"，不参与分类统计
//! - 找到的观测结构为 0 时百分比为 `None`（无数据），不做除法
//!
//! ## 依赖关系
//! - 被 `commands/report.rs` 使用
//! - 使用 `ranking/table.rs`, `models/ranking.rs`

use crate::models::{RankChange, RankClassification};
use crate::ranking::table::RankTable;

use std::collections::HashSet;

/// 一个或多个分组的排名变化结果
#[derive(Debug, Clone, Default)]
pub struct RankChangeReport {
    pub changes: Vec<RankChange>,
    pub not_found: Vec<String>,
}

impl RankChangeReport {
    /// 比较两张排序表中的观测结构
    pub fn compare<'a, I>(original: &RankTable, corrected: &RankTable, observed: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut report = RankChangeReport::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for id in observed {
            if !seen.insert(id) {
                continue;
            }
            match (original.rank_of(id), corrected.rank_of(id)) {
                (Some(old), Some(new)) => report.changes.push(RankChange::new(id, old, new)),
                _ => report.not_found.push(id.to_string()),
            }
        }

        report
    }

    /// 合并另一分组的结果
    pub fn merge(&mut self, other: RankChangeReport) {
        self.changes.extend(other.changes);
        self.not_found.extend(other.not_found);
    }

    pub fn summary(&self) -> RankChangeSummary {
        let mut summary = RankChangeSummary {
            not_found: self.not_found.len(),
            ..Default::default()
        };
        for change in &self.changes {
            match change.classification {
                RankClassification::Improved => summary.improved += 1,
                RankClassification::Worsened => summary.worsened += 1,
                RankClassification::Unchanged => summary.unchanged += 1,
            }
        }
        summary
    }
}

/// 分类计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankChangeSummary {
    pub improved: usize,
    pub worsened: usize,
    pub unchanged: usize,
    pub not_found: usize,
}

impl RankChangeSummary {
    /// 在两张表中都找到的观测结构数
    pub fn found(&self) -> usize {
        self.improved + self.worsened + self.unchanged
    }

    pub fn count(&self, class: RankClassification) -> usize {
        match class {
            RankClassification::Improved => self.improved,
            RankClassification::Worsened => self.worsened,
            RankClassification::Unchanged => self.unchanged,
        }
    }

    /// 该分类占已找到结构的百分比；没有找到任何结构时为 None
    pub fn percentage(&self, class: RankClassification) -> Option<f64> {
        match self.found() {
            0 => None,
            found => Some(100.0 * self.count(class) as f64 / found as f64),
        }
    }
}

/// 百分比格式化，无数据时输出 `n/a`
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(p) => format!("{:.1}%", p),
        None => "n/a".to_string(),
    }
}
