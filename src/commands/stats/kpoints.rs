//! # k 点收敛误差
//!
//! 每个晶体在每个 k 点上两个多晶型的 Debye+KDE 能量差，
//! 相对参考 k 点能量差的偏差，以及跨晶体的误差统计。
//!
//! ## 依赖关系
//! - 使用 `cli/stats.rs` 定义的参数
//! - 使用 `parsers/energy_csv.rs`, `ranking/stats.rs`, `ranking/export.rs`

use super::ensure_output_dir;
use crate::cli::stats::KpointsArgs;
use crate::error::{FreerankError, Result};
use crate::models::EnergyVariant;
use crate::parsers::energy_csv::read_energy_csv;
use crate::parsers::EnergySampleRow;
use crate::ranking::export;
use crate::ranking::stats::{kpoint_errors, kpoint_statistics, CrystalKPointErrors};
use crate::utils::output;

use std::collections::BTreeMap;

/// 按晶体分组的 (多晶型, k, 能量) 样本；缺少能量的行被忽略
pub fn samples_by_crystal(rows: &[EnergySampleRow]) -> BTreeMap<String, Vec<(String, f64, f64)>> {
    let mut by_crystal: BTreeMap<String, Vec<(String, f64, f64)>> = BTreeMap::new();
    for row in rows {
        let Some(energy) = row.energy(EnergyVariant::WithDebyeAndKde) else {
            continue;
        };
        by_crystal.entry(row.crystal.clone()).or_default().push((
            row.polymorph.clone().unwrap_or_default(),
            row.k_point,
            energy,
        ));
    }
    by_crystal
}

/// 执行 kpoints
pub fn execute(args: KpointsArgs) -> Result<()> {
    output::print_header("K-Point Convergence Errors");

    let (rows, skipped) = read_energy_csv(&args.input)?;
    for (line, reason) in &skipped {
        output::print_warning(&format!("Skipped row {}: {}", line, reason));
    }
    ensure_output_dir(&args.output)?;

    let mut per_crystal: Vec<CrystalKPointErrors> = Vec::new();
    for (crystal, samples) in samples_by_crystal(&rows) {
        let result = kpoint_errors(&samples, args.reference_k);

        for (k, found) in &result.mismatched {
            let err = FreerankError::PolymorphCountMismatch {
                group: crystal.clone(),
                k_point: *k,
                expected: 2,
                found: *found,
            };
            output::print_warning(&err.to_string());
        }
        for (k, polymorph, count) in &result.duplicates {
            let err = FreerankError::DuplicateSample {
                group: crystal.clone(),
                polymorph: polymorph.clone(),
                k_point: *k,
                count: *count,
            };
            output::print_warning(&format!("{}, k-point skipped", err));
        }

        if !result.has_reference {
            output::print_warning(&format!(
                "{}: no energy difference at reference k-point {}, skipped",
                crystal, args.reference_k
            ));
            continue;
        }

        let path = args.output.join(format!("{}_k_point_errors.csv", crystal));
        export::kpoint_errors_to_csv(&result.errors, &path)?;
        output::print_written(&crystal, &path.display().to_string());
        per_crystal.push(result);
    }

    let stats = kpoint_statistics(&per_crystal, args.reference_k);
    let path = args.output.join("k_point_error_statistics.csv");
    export::kpoint_statistics_to_csv(&stats, &path)?;
    output::print_written("Statistics", &path.display().to_string());

    output::print_separator();
    for (k, s) in &stats {
        println!(
            "  k = {:<6} MSE {:>10.4}  MAE {:>10.4}  MAX {:>10.4}  (n = {})",
            k, s.mean_signed, s.mean_absolute, s.max_absolute, s.count
        );
    }
    output::print_done(&format!("{} crystal(s) processed", per_crystal.len()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupKey, VibrationalTerms};
    use crate::ranking::correction::correct_terms;

    fn row(crystal: &str, polymorph: &str, k: f64, kde: Option<f64>) -> EnergySampleRow {
        let terms = VibrationalTerms {
            kde_vibrational_energy: kde,
            debye_contribution: Some(0.0),
            phonon_count: Some(3),
            ..Default::default()
        };
        let corrected = correct_terms(&terms);
        EnergySampleRow::new(
            &GroupKey::polymorph(crystal, polymorph),
            k,
            "f.out",
            &terms,
            corrected.as_ref(),
        )
    }

    #[test]
    fn test_samples_grouped_by_crystal() {
        let rows = vec![
            row("b", "form1", 0.1, Some(1.0)),
            row("a", "form1", 0.1, Some(2.0)),
            row("a", "form2", 0.1, None),
        ];
        let grouped = samples_by_crystal(&rows);
        let keys: Vec<_> = grouped.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(grouped["a"].len(), 1);
        assert_eq!(grouped["a"][0], ("form1".to_string(), 0.1, 2.0));
    }

    #[test]
    fn test_execute_writes_errors() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("energies.csv");
        let rows = vec![
            row("abc", "form1", 0.10, Some(10.0)),
            row("abc", "form2", 0.10, Some(12.0)),
            row("abc", "form1", 0.12, Some(10.0)),
            row("abc", "form2", 0.12, Some(13.0)),
            row("abc", "form1", 0.14, Some(10.0)),
        ];
        export::energy_samples_to_csv(&rows, &input).unwrap();

        let out = dir.path().join("out");
        execute(KpointsArgs {
            input,
            output: out.clone(),
            reference_k: 0.10,
        })
        .unwrap();

        let mut rdr = csv::Reader::from_path(out.join("abc_k_point_errors.csv")).unwrap();
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][0], "0.12");
        assert_eq!(&records[1][2], "1");
        assert!(out.join("k_point_error_statistics.csv").is_file());
    }

    #[test]
    fn test_execute_skips_k_point_with_duplicate_sample() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("energies.csv");
        let rows = vec![
            row("abc", "form1", 0.10, Some(10.0)),
            row("abc", "form2", 0.10, Some(12.0)),
            row("abc", "form1", 0.12, Some(10.0)),
            row("abc", "form1", 0.12, Some(50.0)),
            row("abc", "form2", 0.12, Some(13.0)),
            row("abc", "form1", 0.14, Some(10.0)),
            row("abc", "form2", 0.14, Some(11.0)),
        ];
        export::energy_samples_to_csv(&rows, &input).unwrap();

        let out = dir.path().join("out");
        execute(KpointsArgs {
            input,
            output: out.clone(),
            reference_k: 0.10,
        })
        .unwrap();

        let mut rdr = csv::Reader::from_path(out.join("abc_k_point_errors.csv")).unwrap();
        let ks: Vec<String> = rdr
            .records()
            .map(|r| r.unwrap()[0].to_string())
            .collect();
        assert_eq!(ks, vec!["0.1", "0.14"]);
    }
}
