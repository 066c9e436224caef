//! # 排序与误差统计
//!
//! - Kendall τ-b 秩相关系数（含并列修正）
//! - k 点收敛误差：两个多晶型能量差相对参考 k 点的偏差
//! - 误差统计量：平均带符号误差、平均绝对误差、最大绝对误差
//! - 不同 k 点之间的能量极差
//!
//! ## 依赖关系
//! - 被 `commands/rank.rs`, `commands/stats/` 使用
//! - 无外部模块依赖

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// k 值比较容差
const K_TOLERANCE: f64 = 1e-9;

/// 计算 Kendall τ-b；样本少于 2 或某一侧全部并列时返回 None
pub fn kendall_tau_b<T: PartialOrd>(x: &[T], y: &[T]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }

    let sign = |a: &T, b: &T| match a.partial_cmp(b) {
        Some(Ordering::Less) => -1i64,
        Some(Ordering::Greater) => 1,
        _ => 0,
    };

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut ties_x = 0i64;
    let mut ties_y = 0i64;

    for i in 0..n {
        for j in (i + 1)..n {
            let dx = sign(&x[i], &x[j]);
            let dy = sign(&y[i], &y[j]);
            if dx == 0 {
                ties_x += 1;
            }
            if dy == 0 {
                ties_y += 1;
            }
            match dx * dy {
                p if p > 0 => concordant += 1,
                p if p < 0 => discordant += 1,
                _ => {}
            }
        }
    }

    let n0 = (n * (n - 1) / 2) as i64;
    let denom = ((n0 - ties_x) as f64 * (n0 - ties_y) as f64).sqrt();
    if denom == 0.0 {
        return None;
    }

    Some((concordant - discordant) as f64 / denom)
}

/// 每个元素在稳定升序排序中的位置（0 起始）
pub fn sorted_positions<T: PartialOrd>(keys: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].partial_cmp(&keys[b]).unwrap_or(Ordering::Equal));

    let mut positions = vec![0; keys.len()];
    for (pos, idx) in order.into_iter().enumerate() {
        positions[idx] = pos;
    }
    positions
}

/// 误差统计量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorStatistics {
    pub mean_signed: f64,
    pub mean_absolute: f64,
    pub max_absolute: f64,
    pub count: usize,
}

impl ErrorStatistics {
    /// 空输入返回 None
    pub fn from_errors(errors: &[f64]) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        let n = errors.len() as f64;
        Some(ErrorStatistics {
            mean_signed: errors.iter().sum::<f64>() / n,
            mean_absolute: errors.iter().map(|e| e.abs()).sum::<f64>() / n,
            max_absolute: errors.iter().map(|e| e.abs()).fold(0.0, f64::max),
            count: errors.len(),
        })
    }
}

/// 单个 k 点上的多晶型能量差与误差
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KPointError {
    pub k_point: f64,
    pub energy_difference: f64,
    /// 相对参考 k 点能量差的偏差
    pub error: f64,
}

/// 一个晶体的 k 点收敛结果
#[derive(Debug, Clone, Default)]
pub struct CrystalKPointErrors {
    pub errors: Vec<KPointError>,
    /// 多晶型数量不是 2 的 k 点：(k, 实际数量)
    pub mismatched: Vec<(f64, usize)>,
    /// 同一多晶型在同一 k 点有多个样本：(k, 多晶型, 样本数)
    pub duplicates: Vec<(f64, String, usize)>,
    /// 参考 k 点是否可用
    pub has_reference: bool,
}

/// k 值分组键，容差内的 k 值视为同一点
pub(crate) fn k_key(k: f64) -> i64 {
    (k / K_TOLERANCE).round() as i64
}

/// 计算单个晶体的 k 点误差
///
/// `samples` 为 (多晶型, k 值, 能量)。每个 k 点需要恰好两个多晶型且
/// 每个多晶型恰好一个样本，否则该 k 点被跳过并记录；
/// 参考 k 点缺失时不输出误差。
pub fn kpoint_errors(samples: &[(String, f64, f64)], reference_k: f64) -> CrystalKPointErrors {
    let mut by_k: BTreeMap<i64, (f64, BTreeMap<&str, Vec<f64>>)> = BTreeMap::new();
    for (polymorph, k, energy) in samples {
        let entry = by_k.entry(k_key(*k)).or_insert_with(|| (*k, BTreeMap::new()));
        entry.1.entry(polymorph.as_str()).or_default().push(*energy);
    }

    let mut result = CrystalKPointErrors::default();
    let mut differences: Vec<(f64, f64)> = Vec::new();
    for (k, polymorphs) in by_k.values() {
        let mut duplicated = false;
        for (polymorph, energies) in polymorphs {
            if energies.len() > 1 {
                result
                    .duplicates
                    .push((*k, polymorph.to_string(), energies.len()));
                duplicated = true;
            }
        }
        if polymorphs.len() != 2 {
            result.mismatched.push((*k, polymorphs.len()));
            continue;
        }
        if duplicated {
            continue;
        }
        let energies: Vec<f64> = polymorphs.values().map(|e| e[0]).collect();
        differences.push((*k, (energies[0] - energies[1]).abs()));
    }

    let reference = differences
        .iter()
        .find(|(k, _)| k_key(*k) == k_key(reference_k))
        .map(|(_, d)| *d);

    if let Some(reference) = reference {
        result.has_reference = true;
        result.errors = differences
            .into_iter()
            .map(|(k_point, energy_difference)| KPointError {
                k_point,
                energy_difference,
                error: energy_difference - reference,
            })
            .collect();
    }

    result
}

/// 按 k 点汇总多个晶体的误差统计（不含参考 k 点）
pub fn kpoint_statistics<'a, I>(crystals: I, reference_k: f64) -> Vec<(f64, ErrorStatistics)>
where
    I: IntoIterator<Item = &'a CrystalKPointErrors>,
{
    let mut by_k: BTreeMap<i64, (f64, Vec<f64>)> = BTreeMap::new();
    for crystal in crystals {
        for e in &crystal.errors {
            if k_key(e.k_point) == k_key(reference_k) {
                continue;
            }
            by_k.entry(k_key(e.k_point))
                .or_insert_with(|| (e.k_point, Vec::new()))
                .1
                .push(e.error);
        }
    }

    by_k.into_values()
        .filter_map(|(k, errors)| ErrorStatistics::from_errors(&errors).map(|s| (k, s)))
        .collect()
}

/// 一个能量变体在不同 k 点之间的极差
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySpread {
    pub highest: f64,
    pub highest_k: f64,
    pub lowest: f64,
    pub lowest_k: f64,
}

impl EnergySpread {
    pub fn difference(&self) -> f64 {
        self.highest - self.lowest
    }
}

/// 计算 (k, 能量) 序列的极差；没有可用能量时返回 None
pub fn energy_spread<I>(values: I) -> Option<EnergySpread>
where
    I: IntoIterator<Item = (f64, Option<f64>)>,
{
    let mut spread: Option<EnergySpread> = None;
    for (k, energy) in values {
        let Some(e) = energy else { continue };
        match spread.as_mut() {
            None => {
                spread = Some(EnergySpread {
                    highest: e,
                    highest_k: k,
                    lowest: e,
                    lowest_k: k,
                })
            }
            Some(s) => {
                if e > s.highest {
                    s.highest = e;
                    s.highest_k = k;
                }
                if e < s.lowest {
                    s.lowest = e;
                    s.lowest_k = k;
                }
            }
        }
    }
    spread
}
