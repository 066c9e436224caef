//! # 计算耗时统计
//!
//! 将单个计时文件汇总为每个 (晶体, 多晶型, k 点) 的总耗时与各程序段平均耗时，
//! 结合采样的唯一 k 点数给出每个 k 点的耗时，并按 k 值跨分组平均。
//!
//! ## 依赖关系
//! - 被 `commands/stats/timing.rs`, `ranking/export.rs` 使用
//! - 使用 `parsers/timing.rs`, `parsers/naming.rs`

use crate::models::GroupKey;
use crate::parsers::naming::SampleKey;
use crate::parsers::timing::{RunTimings, TimingSection};
use crate::ranking::stats::k_key;

use std::collections::{BTreeMap, HashMap};

/// 一个分组在一个 k 值下的耗时
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTiming {
    pub group: GroupKey,
    pub k_point: f64,
    /// 参与统计的计时文件数
    pub files: usize,
    /// 缺少 "Total run time" 的文件数
    pub missing_total: usize,
    /// 各文件 "Total run time" 之和 (CPU 秒)
    pub total_seconds: f64,
    /// 各程序段在文件间的平均耗时
    pub section_means: BTreeMap<TimingSection, f64>,
    pub sampled_k_points: Option<u32>,
}

impl GroupTiming {
    pub fn total_minutes(&self) -> f64 {
        self.total_seconds / 60.0
    }

    pub fn total_hours(&self) -> f64 {
        self.total_seconds / 3600.0
    }

    /// 每个采样 k 点的耗时；k 点数未知或为 0 时为 None
    pub fn seconds_per_k_point(&self) -> Option<f64> {
        self.sampled_k_points
            .filter(|&n| n > 0)
            .map(|n| self.total_seconds / n as f64)
    }
}

/// 同一 k 值下跨分组的平均耗时
#[derive(Debug, Clone, PartialEq)]
pub struct KPointTiming {
    pub k_point: f64,
    pub groups: usize,
    pub mean_total_seconds: f64,
    /// 有 k 点数的分组的平均采样 k 点数
    pub mean_sampled_k_points: Option<f64>,
    /// 平均总耗时 / 平均采样 k 点数（仅统计有 k 点数的分组）
    pub mean_seconds_per_k_point: Option<f64>,
}

type TimingKey = (String, Option<String>, i64);

fn timing_key(group: &GroupKey, k_point: f64) -> TimingKey {
    (group.crystal.clone(), group.polymorph.clone(), k_key(k_point))
}

/// 按分组和 k 值汇总计时文件
///
/// `sampled` 为 (分组, k 值, 采样唯一 k 点数)，同一键取第一个。
/// 输出按晶体、多晶型、k 值排序。
pub fn group_timings(
    samples: &[(SampleKey, RunTimings)],
    sampled: &[(GroupKey, f64, u32)],
) -> Vec<GroupTiming> {
    let mut k_points: HashMap<TimingKey, u32> = HashMap::new();
    for (group, k, n) in sampled {
        k_points.entry(timing_key(group, *k)).or_insert(*n);
    }

    let mut by_key: BTreeMap<TimingKey, (&SampleKey, Vec<&RunTimings>)> = BTreeMap::new();
    for (key, timings) in samples {
        by_key
            .entry(timing_key(&key.group, key.k_point))
            .or_insert_with(|| (key, Vec::new()))
            .1
            .push(timings);
    }

    by_key
        .into_iter()
        .map(|(tk, (key, runs))| {
            let mut sums: BTreeMap<TimingSection, (f64, usize)> = BTreeMap::new();
            for run in &runs {
                for (section, seconds) in run.iter() {
                    let entry = sums.entry(section).or_insert((0.0, 0));
                    entry.0 += seconds;
                    entry.1 += 1;
                }
            }

            GroupTiming {
                group: key.group.clone(),
                k_point: key.k_point,
                files: runs.len(),
                missing_total: runs.iter().filter(|r| r.total().is_none()).count(),
                total_seconds: runs.iter().filter_map(|r| r.total()).sum(),
                section_means: sums
                    .into_iter()
                    .map(|(s, (sum, n))| (s, sum / n as f64))
                    .collect(),
                sampled_k_points: k_points.get(&tk).copied(),
            }
        })
        .collect()
}

/// 按 k 值跨分组平均（k 值升序）
pub fn timing_by_k_point(groups: &[GroupTiming]) -> Vec<KPointTiming> {
    let mut by_k: BTreeMap<i64, (f64, Vec<&GroupTiming>)> = BTreeMap::new();
    for g in groups {
        by_k.entry(k_key(g.k_point))
            .or_insert_with(|| (g.k_point, Vec::new()))
            .1
            .push(g);
    }

    by_k.into_values()
        .map(|(k_point, gs)| {
            let mean = |values: &[f64]| {
                (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
            };

            let totals: Vec<f64> = gs.iter().map(|g| g.total_seconds).collect();
            let with_counts: Vec<(f64, f64)> = gs
                .iter()
                .filter_map(|g| {
                    g.sampled_k_points
                        .filter(|&n| n > 0)
                        .map(|n| (g.total_seconds, n as f64))
                })
                .collect();
            let counted_totals: Vec<f64> = with_counts.iter().map(|(t, _)| *t).collect();
            let counts: Vec<f64> = with_counts.iter().map(|(_, n)| *n).collect();

            let mean_sampled_k_points = mean(&counts);
            let mean_seconds_per_k_point = mean(&counted_totals)
                .zip(mean_sampled_k_points)
                .map(|(t, n)| t / n);

            KPointTiming {
                k_point,
                groups: gs.len(),
                mean_total_seconds: mean(&totals).unwrap_or(0.0),
                mean_sampled_k_points,
                mean_seconds_per_k_point,
            }
        })
        .collect()
}
