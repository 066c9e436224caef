//! # 结构排序表
//!
//! 对同一晶体/多晶型分组内的能量记录按选定能量升序排序。
//!
//! ## 排序规则
//! - 稳定排序，排名为 1 起始的位置
//! - 能量完全相等的记录共享并列中最小的排名（"min" 规则）
//! - 选定能量无法计算的记录不参与排序，记为未排序
//! - 组内 id 必须唯一，重复 id 作为数据完整性错误返回
//!
//! ## 依赖关系
//! - 被 `ranking/change.rs`, `ranking/export.rs`, `commands/rank.rs` 使用
//! - 使用 `ranking/correction.rs` 计算校正能量

use crate::error::{FreerankError, Result};
use crate::models::{EnergyRecord, EnergyVariant, GroupKey};
use crate::ranking::correction;

use std::collections::{HashMap, HashSet};

/// 排序键选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergySelector {
    /// 仅静态晶格能
    Lattice,
    /// 晶格能 + 指定的振动自由能变体
    Corrected(EnergyVariant),
}

impl EnergySelector {
    /// 计算记录的排序能量；缺少输入或非有限值时返回 None
    pub fn energy(&self, record: &EnergyRecord) -> Option<f64> {
        let energy = match self {
            EnergySelector::Lattice => record.lattice_energy,
            EnergySelector::Corrected(variant) => {
                record.lattice_energy + correction::variant_energy(&record.terms, *variant)?
            }
        };
        energy.is_finite().then_some(energy)
    }
}

/// 排序表中的一项
#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    pub record: EnergyRecord,
    /// 排序所用能量 (kJ/mol)
    pub energy: f64,
    /// 1 起始排名
    pub rank: usize,
}

/// 一个分组的排序表
#[derive(Debug, Clone)]
pub struct RankTable {
    entries: Vec<RankEntry>,
    unranked: Vec<EnergyRecord>,
    index: HashMap<String, usize>,
}

impl RankTable {
    /// 构建排序表
    pub fn build(
        group: &GroupKey,
        records: &[EnergyRecord],
        selector: EnergySelector,
    ) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.id.as_str()) {
                return Err(FreerankError::DuplicateId {
                    id: record.id.clone(),
                    group: group.to_string(),
                });
            }
        }

        let mut scored: Vec<(&EnergyRecord, f64)> = Vec::with_capacity(records.len());
        let mut unranked = Vec::new();
        for record in records {
            match selector.energy(record) {
                Some(e) => scored.push((record, e)),
                None => unranked.push(record.clone()),
            }
        }

        // sort_by 是稳定排序，并列时保留输入顺序
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut entries: Vec<RankEntry> = Vec::with_capacity(scored.len());
        for (pos, (record, energy)) in scored.into_iter().enumerate() {
            let rank = match entries.last() {
                Some(prev) if prev.energy == energy => prev.rank,
                _ => pos + 1,
            };
            entries.push(RankEntry {
                record: record.clone(),
                energy,
                rank,
            });
        }

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.record.id.clone(), i))
            .collect();

        Ok(RankTable {
            entries,
            unranked,
            index,
        })
    }

    /// 按排名顺序的已排序项
    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    /// 未能排序的记录（输入顺序）
    pub fn unranked(&self) -> &[EnergyRecord] {
        &self.unranked
    }

    pub fn get(&self, id: &str) -> Option<&RankEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.get(id).map(|e| e.rank)
    }

    pub fn energy_of(&self, id: &str) -> Option<f64> {
        self.get(id).map(|e| e.energy)
    }

    /// 已排序的记录数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 同一分组的原始排序与校正后排序
#[derive(Debug, Clone)]
pub struct GroupRanking {
    pub variant: EnergyVariant,
    pub original: RankTable,
    pub corrected: RankTable,
}

impl GroupRanking {
    /// 构建两张排序表
    ///
    /// `common_only` 为真时，原始排序只包含能计算校正能量的记录，
    /// 两张表的排名因此可以直接比较。
    pub fn build(
        group: GroupKey,
        records: &[EnergyRecord],
        variant: EnergyVariant,
        common_only: bool,
    ) -> Result<Self> {
        let corrected_selector = EnergySelector::Corrected(variant);
        let corrected = RankTable::build(&group, records, corrected_selector)?;

        let original = if common_only {
            let common: Vec<EnergyRecord> = records
                .iter()
                .filter(|r| corrected_selector.energy(r).is_some())
                .cloned()
                .collect();
            RankTable::build(&group, &common, EnergySelector::Lattice)?
        } else {
            RankTable::build(&group, records, EnergySelector::Lattice)?
        };

        Ok(GroupRanking {
            variant,
            original,
            corrected,
        })
    }

    /// 记录的振动自由能（校正能量减去晶格能）
    pub fn free_energy(&self, record: &EnergyRecord) -> Option<f64> {
        correction::variant_energy(&record.terms, self.variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VibrationalTerms;

    fn record(id: &str, energy: f64) -> EnergyRecord {
        EnergyRecord::new(id, energy)
    }

    fn record_with_kde(id: &str, energy: f64, kde: f64) -> EnergyRecord {
        record(id, energy).with_terms(VibrationalTerms {
            kde_vibrational_energy: Some(kde),
            debye_contribution: Some(0.0),
            phonon_count: Some(3),
            ..Default::default()
        })
    }

    fn group() -> GroupKey {
        GroupKey::crystal("izijoq")
    }

    #[test]
    fn test_lower_energy_ranks_first() {
        let records = vec![record("A", -500.0), record("B", -510.0)];
        let table = RankTable::build(&group(), &records, EnergySelector::Lattice).unwrap();

        assert_eq!(table.rank_of("A"), Some(2));
        assert_eq!(table.rank_of("B"), Some(1));
        assert_eq!(table.entries()[0].record.id, "B");
    }

    #[test]
    fn test_empty_input_gives_empty_table() {
        let table = RankTable::build(&group(), &[], EnergySelector::Lattice).unwrap();
        assert!(table.is_empty());
        assert!(table.unranked().is_empty());
    }

    #[test]
    fn test_ties_share_min_rank() {
        let records = vec![
            record("A", -3.0),
            record("B", -5.0),
            record("C", -3.0),
            record("D", -1.0),
        ];
        let table = RankTable::build(&group(), &records, EnergySelector::Lattice).unwrap();

        assert_eq!(table.rank_of("B"), Some(1));
        assert_eq!(table.rank_of("A"), Some(2));
        assert_eq!(table.rank_of("C"), Some(2));
        assert_eq!(table.rank_of("D"), Some(4));
        // 并列时保留输入顺序
        assert_eq!(table.entries()[1].record.id, "A");
        assert_eq!(table.entries()[2].record.id, "C");
    }

    #[test]
    fn test_ranks_are_monotone_in_energy() {
        let energies = [-12.0, 4.5, -3.25, 0.0, 7.0, -12.0, 19.5, -0.5];
        let records: Vec<_> = energies
            .iter()
            .enumerate()
            .map(|(i, &e)| record(&format!("s{}", i), e))
            .collect();
        let table = RankTable::build(&group(), &records, EnergySelector::Lattice).unwrap();

        assert_eq!(table.len(), energies.len());
        for a in table.entries() {
            assert!(a.rank >= 1 && a.rank <= energies.len());
            for b in table.entries() {
                if a.energy < b.energy {
                    assert!(a.rank < b.rank);
                }
                if a.energy == b.energy {
                    assert_eq!(a.rank, b.rank);
                }
            }
        }
    }

    #[test]
    fn test_distinct_energies_give_permutation() {
        let records: Vec<_> = (0..20)
            .map(|i| record(&format!("s{}", i), ((i * 7) % 20) as f64))
            .collect();
        let table = RankTable::build(&group(), &records, EnergySelector::Lattice).unwrap();

        let mut ranks: Vec<usize> = table.entries().iter().map(|e| e.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_inputs_are_unranked() {
        let records = vec![
            record_with_kde("A", -100.0, 10.0),
            record("B", -120.0),
            record_with_kde("C", -105.0, 2.0),
        ];
        let selector = EnergySelector::Corrected(EnergyVariant::WithDebyeAndKde);
        let table = RankTable::build(&group(), &records, selector).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rank_of("C"), Some(1));
        assert_eq!(table.rank_of("A"), Some(2));
        assert_eq!(table.rank_of("B"), None);
        assert_eq!(table.unranked()[0].id, "B");
    }

    #[test]
    fn test_duplicate_id_is_reported() {
        let records = vec![record("A", -1.0), record("A", -2.0)];
        let err = RankTable::build(&group(), &records, EnergySelector::Lattice).unwrap_err();
        assert!(matches!(err, FreerankError::DuplicateId { ref id, .. } if id == "A"));
    }

    #[test]
    fn test_rerank_from_own_rank_column_reproduces_order() {
        let records: Vec<_> = [3.0, -1.0, 2.0, -1.0, 8.0]
            .iter()
            .enumerate()
            .map(|(i, &e)| record(&format!("s{}", i), e))
            .collect();
        let table = RankTable::build(&group(), &records, EnergySelector::Lattice).unwrap();

        let rerank_input: Vec<_> = table
            .entries()
            .iter()
            .rev()
            .map(|e| record(&e.record.id, e.rank as f64))
            .collect();
        let mut expected: Vec<_> = table.entries().iter().map(|e| e.record.id.clone()).collect();
        let reranked = RankTable::build(&group(), &rerank_input, EnergySelector::Lattice).unwrap();

        let mut order: Vec<_> = reranked.entries().iter().map(|e| e.record.id.clone()).collect();
        for e in table.entries() {
            assert_eq!(reranked.rank_of(&e.record.id), Some(e.rank));
        }
        // 并列项之间的相对顺序不作要求
        order.sort();
        expected.sort();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_group_ranking_common_only() {
        let records = vec![
            record_with_kde("A", -100.0, 10.0),
            record("B", -120.0),
            record_with_kde("C", -105.0, 2.0),
        ];

        let all = GroupRanking::build(group(), &records, EnergyVariant::WithDebyeAndKde, false)
            .unwrap();
        assert_eq!(all.original.rank_of("B"), Some(1));
        assert_eq!(all.original.rank_of("A"), Some(3));

        let common = GroupRanking::build(group(), &records, EnergyVariant::WithDebyeAndKde, true)
            .unwrap();
        assert_eq!(common.original.rank_of("B"), None);
        assert_eq!(common.original.rank_of("C"), Some(1));
        assert_eq!(common.original.rank_of("A"), Some(2));
        assert_eq!(common.free_energy(&records[0]), Some(10.0));
    }
}
