//! # 数据导出
//!
//! 将排序表、合并能量表、排名变化与统计结果写出为 CSV。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块调用
//! - 使用 `ranking/table.rs`, `ranking/stats.rs`, `ranking/timing.rs`
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{FreerankError, Result};
use crate::models::EnergyVariant;
use crate::parsers::timing::TimingSection;
use crate::parsers::EnergySampleRow;
use crate::ranking::stats::{EnergySpread, ErrorStatistics, KPointError};
use crate::ranking::table::GroupRanking;
use crate::ranking::timing::{GroupTiming, KPointTiming};

use serde::Serialize;
use std::path::Path;

/// 不可用值的占位符
pub const NOT_AVAILABLE: &str = "N/A";

fn opt_to_string<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn flush<W: std::io::Write>(wtr: &mut csv::Writer<W>, output_path: &Path) -> Result<()> {
    wtr.flush().map_err(|e| FreerankError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}

/// 排序表列名
pub const RANKING_HEADER: [&str; 11] = [
    "id",
    "spacegroup",
    "density",
    "energy",
    "minimization_step",
    "trial_number",
    "minimization_time",
    "free energy",
    "new energy",
    "original rank",
    "new rank",
];

/// 导出一个分组的排序表（按新排名排序，未排序的记录在末尾）
pub fn ranking_to_csv(ranking: &GroupRanking, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record(RANKING_HEADER)?;

    let ranked = ranking.corrected.entries().iter().map(|e| &e.record);
    let unranked = ranking.corrected.unranked().iter();

    for record in ranked.chain(unranked) {
        let m = &record.minimization;
        wtr.write_record([
            record.id.clone(),
            record.spacegroup.clone().unwrap_or_default(),
            record.density.map(|d| d.to_string()).unwrap_or_default(),
            record.lattice_energy.to_string(),
            m.minimization_step.clone().unwrap_or_default(),
            m.trial_number.clone().unwrap_or_default(),
            m.minimization_time.clone().unwrap_or_default(),
            opt_to_string(ranking.free_energy(record)),
            opt_to_string(ranking.corrected.energy_of(&record.id)),
            opt_to_string(ranking.original.rank_of(&record.id)),
            opt_to_string(ranking.corrected.rank_of(&record.id)),
        ])?;
    }

    flush(&mut wtr, output_path)
}

/// 导出合并能量表
pub fn energy_samples_to_csv(rows: &[EnergySampleRow], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    flush(&mut wtr, output_path)
}

/// 导出单个晶体的 k 点误差
pub fn kpoint_errors_to_csv(errors: &[KPointError], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record(["k_point", "energy_difference", "error"])?;

    for e in errors {
        wtr.write_record([
            e.k_point.to_string(),
            e.energy_difference.to_string(),
            e.error.to_string(),
        ])?;
    }

    flush(&mut wtr, output_path)
}

/// 导出各 k 点的误差统计
pub fn kpoint_statistics_to_csv(stats: &[(f64, ErrorStatistics)], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record([
        "k_point",
        "mean_signed_error",
        "mean_absolute_error",
        "max_absolute_error",
        "samples",
    ])?;

    for (k, s) in stats {
        wtr.write_record([
            k.to_string(),
            s.mean_signed.to_string(),
            s.mean_absolute.to_string(),
            s.max_absolute.to_string(),
            s.count.to_string(),
        ])?;
    }

    flush(&mut wtr, output_path)
}

/// 导出一个分组的能量极差报告
pub fn spread_to_csv(
    spreads: &[(EnergyVariant, Option<EnergySpread>)],
    output_path: &Path,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record([
        "energy_section",
        "highest_energy",
        "lowest_energy",
        "difference",
        "highest_k_point",
        "lowest_k_point",
    ])?;

    for (variant, spread) in spreads {
        match spread {
            Some(s) => wtr.write_record([
                variant.to_string(),
                s.highest.to_string(),
                s.lowest.to_string(),
                s.difference().to_string(),
                s.highest_k.to_string(),
                s.lowest_k.to_string(),
            ])?,
            None => wtr.write_record([
                variant.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                String::new(),
                String::new(),
            ])?,
        }
    }

    flush(&mut wtr, output_path)
}

/// 导出平均极差
pub fn average_spread_to_csv(averages: &[(EnergyVariant, Option<f64>)], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record(["energy_section", "average_difference"])?;

    for (variant, avg) in averages {
        wtr.write_record([variant.to_string(), opt_to_string(*avg)])?;
    }

    flush(&mut wtr, output_path)
}

/// 导出各分组在各 k 值下的耗时
pub fn group_timings_to_csv(timings: &[GroupTiming], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    let mut header = vec![
        "crystal",
        "polymorph",
        "k_point",
        "files",
        "total_seconds",
        "total_minutes",
        "total_hours",
        "sampled_k_points",
        "seconds_per_k_point",
    ];
    header.extend(TimingSection::ALL.iter().map(|s| s.column()));
    wtr.write_record(&header)?;

    for t in timings {
        let mut record = vec![
            t.group.crystal.clone(),
            t.group.polymorph.clone().unwrap_or_default(),
            t.k_point.to_string(),
            t.files.to_string(),
            t.total_seconds.to_string(),
            t.total_minutes().to_string(),
            t.total_hours().to_string(),
            opt_to_string(t.sampled_k_points),
            opt_to_string(t.seconds_per_k_point()),
        ];
        record.extend(
            TimingSection::ALL
                .iter()
                .map(|s| opt_to_string(t.section_means.get(s))),
        );
        wtr.write_record(&record)?;
    }

    flush(&mut wtr, output_path)
}

/// 导出按 k 值平均的耗时
pub fn kpoint_timings_to_csv(timings: &[KPointTiming], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record([
        "k_point",
        "groups",
        "mean_total_seconds",
        "mean_sampled_k_points",
        "mean_seconds_per_k_point",
    ])?;

    for t in timings {
        wtr.write_record([
            t.k_point.to_string(),
            t.groups.to_string(),
            t.mean_total_seconds.to_string(),
            opt_to_string(t.mean_sampled_k_points),
            opt_to_string(t.mean_seconds_per_k_point),
        ])?;
    }

    flush(&mut wtr, output_path)
}

/// 导出 Kendall τ 结果
pub fn kendall_to_csv(results: &[(String, Option<f64>)], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record(["molecule", "kendall_tau"])?;

    for (molecule, tau) in results {
        wtr.write_record([molecule.clone(), opt_to_string(*tau)])?;
    }

    flush(&mut wtr, output_path)
}

/// 观测结构排名变化表的一行
#[derive(Debug, Clone, Serialize)]
pub struct RankChangeRow {
    #[serde(rename = "refcode")]
    pub refcode: String,
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "original rank")]
    pub original_rank: usize,
    #[serde(rename = "new rank")]
    pub new_rank: usize,
    #[serde(rename = "rank change")]
    pub delta: i64,
    #[serde(rename = "classification")]
    pub classification: String,
    #[serde(rename = "observed rank")]
    pub observed_rank: Option<u32>,
    #[serde(rename = "energy")]
    pub energy: f64,
    #[serde(rename = "new energy")]
    pub new_energy: f64,
    #[serde(rename = "source")]
    pub source: String,
}

/// 导出排名变化表
pub fn rank_changes_to_csv(rows: &[RankChangeRow], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    flush(&mut wtr, output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnergyRecord, GroupKey, VibrationalTerms};
    use crate::parsers::ranking_csv::read_ranking_csv;

    fn record(id: &str, lattice: f64, kde: Option<f64>) -> EnergyRecord {
        let mut r = EnergyRecord::new(id, lattice).with_terms(VibrationalTerms {
            kde_vibrational_energy: kde,
            debye_contribution: Some(0.5),
            phonon_count: Some(43),
            ..Default::default()
        });
        r.spacegroup = Some("P21/c".to_string());
        r
    }

    #[test]
    fn test_ranking_csv_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("izijoq-ranking.csv");

        let records = vec![
            record("s1", -100.0, Some(20.0)),
            record("s2", -98.0, Some(10.0)),
            record("s3", -99.0, None),
            record("s4", -97.0, Some(15.0)),
        ];
        let ranking = GroupRanking::build(
            GroupKey::crystal("izijoq"),
            &records,
            EnergyVariant::WithDebyeAndKde,
            false,
        )
        .unwrap();
        ranking_to_csv(&ranking, &path).unwrap();

        let rows = read_ranking_csv(&path).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s4", "s1", "s3"]);

        for row in &rows {
            assert_eq!(row.original_rank, ranking.original.rank_of(&row.id));
            assert_eq!(row.new_rank, ranking.corrected.rank_of(&row.id));
        }
        assert_eq!(rows[3].new_rank, None);
        assert_eq!(rows[3].original_rank, Some(2));
    }

    #[test]
    fn test_energy_samples_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("energies.csv");

        let terms = VibrationalTerms {
            neat_vibrational_energy: Some(100.0),
            debye_contribution: Some(5.0),
            kde_vibrational_energy: Some(95.0),
            phonon_count: Some(10),
            sampled_k_points: None,
        };
        let corrected = crate::ranking::correction::correct_terms(&terms);
        let row = EnergySampleRow::new(
            &GroupKey::polymorph("cumjoj", "form1"),
            0.12,
            "cumjoj_form1_0.12.out",
            &terms,
            corrected.as_ref(),
        );
        energy_samples_to_csv(&[row.clone()], &path).unwrap();

        let (rows, skipped) = crate::parsers::energy_csv::read_energy_csv(&path).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sampled_k_points, None);
        assert_eq!(rows[0].group(), GroupKey::polymorph("cumjoj", "form1"));
        let e = rows[0].energy(EnergyVariant::WithDebyeAndKde).unwrap();
        assert!((e - 71.5).abs() < 1e-9);
    }
}
