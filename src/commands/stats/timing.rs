//! # 计算耗时
//!
//! 读取 DMACRYS 计时表，按 (晶体, 多晶型, k 值) 汇总总耗时，
//! 结合 `extract` 能量表中的采样 k 点数给出每个 k 点的耗时，
//! 并按 k 值跨分组平均。
//!
//! ## 依赖关系
//! - 使用 `cli/stats.rs` 定义的参数
//! - 使用 `batch/` 收集与执行
//! - 使用 `parsers/timing.rs`, `parsers/naming.rs`, `parsers/energy_csv.rs`
//! - 使用 `ranking/timing.rs`, `ranking/export.rs`

use super::ensure_output_dir;
use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::stats::TimingArgs;
use crate::error::{FreerankError, Result};
use crate::models::GroupKey;
use crate::parsers::energy_csv::read_energy_csv;
use crate::parsers::naming::SampleKey;
use crate::parsers::timing::{parse_timing_file, RunTimings};
use crate::parsers::{timing_key_from_path, EnergySampleRow};
use crate::ranking::export;
use crate::ranking::timing::{group_timings, timing_by_k_point};
use crate::utils::output;

use std::path::Path;

/// 处理单个计时文件
fn process_timing(
    root: &Path,
    path: &Path,
    warn: &mut dyn FnMut(String),
) -> ProcessResult<(SampleKey, RunTimings)> {
    let display = path.display().to_string();

    let key = match timing_key_from_path(root, path) {
        Ok(key) => key,
        Err(e) => {
            warn(format!("{}", e));
            return ProcessResult::Skipped;
        }
    };

    let parsed = match parse_timing_file(path) {
        Ok(parsed) => parsed,
        Err(e) => return ProcessResult::Failed(display, e.to_string()),
    };

    for diag in &parsed.diagnostics {
        warn(format!("{}: {}", display, diag));
    }

    if parsed.timings.is_empty() {
        let err = FreerankError::ParseError {
            format: "DMACRYS timing".to_string(),
            path: display.clone(),
            reason: "no timing table".to_string(),
        };
        return ProcessResult::Failed(display, err.to_string());
    }

    ProcessResult::Success((key, parsed.timings))
}

/// 能量表中的采样 k 点数
pub fn sampled_k_points(rows: &[EnergySampleRow]) -> Vec<(GroupKey, f64, u32)> {
    rows.iter()
        .filter_map(|r| r.sampled_k_points.map(|n| (r.group(), r.k_point, n)))
        .collect()
}

/// 执行 timing
pub fn execute(args: TimingArgs) -> Result<()> {
    output::print_header("Run Time by K-Point Spacing");

    if !args.input.is_dir() {
        return Err(FreerankError::DirectoryNotFound {
            path: args.input.display().to_string(),
        });
    }

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(true)
        .collect();
    if files.is_empty() {
        return Err(FreerankError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }
    output::print_info(&format!(
        "Found {} timing file(s) matching '{}'",
        files.len(),
        args.pattern
    ));

    let sampled = match &args.energies {
        Some(path) => {
            let (rows, skipped) = read_energy_csv(path)?;
            for (line, reason) in &skipped {
                output::print_warning(&format!("Skipped row {}: {}", line, reason));
            }
            sampled_k_points(&rows)
        }
        None => Vec::new(),
    };

    let result = BatchRunner::new("Parsing timings").run(&files, |path, pb| {
        process_timing(&args.input, path, &mut |msg| {
            pb.suspend(|| output::print_warning(&msg))
        })
    });

    let groups = group_timings(&result.outputs, &sampled);
    for g in groups.iter().filter(|g| g.missing_total > 0) {
        output::print_warning(&format!(
            "{} at k-point {}: {} of {} file(s) have no 'Total run time'",
            g.group, g.k_point, g.missing_total, g.files
        ));
    }
    if args.energies.is_some() {
        let unknown = groups.iter().filter(|g| g.sampled_k_points.is_none()).count();
        if unknown > 0 {
            output::print_warning(&format!(
                "{} group(s) have no sampled k-point count in the energy table",
                unknown
            ));
        }
    }

    ensure_output_dir(&args.output)?;
    let path = args.output.join("run_times.csv");
    export::group_timings_to_csv(&groups, &path)?;
    output::print_written("Run times", &path.display().to_string());

    let by_k = timing_by_k_point(&groups);
    let path = args.output.join("run_time_by_k_point.csv");
    export::kpoint_timings_to_csv(&by_k, &path)?;
    output::print_written("Averages", &path.display().to_string());

    output::print_separator();
    for t in &by_k {
        match t.mean_seconds_per_k_point {
            Some(per_k) => println!(
                "  k = {:<6} mean {:>12.2} s  per k-point {:>10.4} s  (n = {})",
                t.k_point, t.mean_total_seconds, per_k, t.groups
            ),
            None => println!(
                "  k = {:<6} mean {:>12.2} s  per k-point        n/a  (n = {})",
                t.k_point, t.mean_total_seconds, t.groups
            ),
        }
    }
    output::print_done(&format!(
        "{} file(s) parsed, {} skipped, {} failed",
        result.outputs.len(),
        result.skipped,
        result.failures.len()
    ));
    for (path, err) in &result.failures {
        output::print_error(&format!("{}: {}", path, err));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VibrationalTerms;
    use crate::ranking::correction::correct_terms;
    use std::fs;

    fn write_timing(root: &Path, crystal: &str, polymorph: &str, k: &str, name: &str, total: f64) {
        let dir = root
            .join(crystal)
            .join(polymorph)
            .join("dmacrys")
            .join(format!("k_value_{}", k));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(name),
            format!(
                " Time to set things up        1.00\n Total run time        {:.2}\n",
                total
            ),
        )
        .unwrap();
    }

    fn energy_row(polymorph: &str, k: f64, sampled: u32) -> EnergySampleRow {
        let terms = VibrationalTerms {
            kde_vibrational_energy: Some(1.0),
            debye_contribution: Some(0.0),
            phonon_count: Some(3),
            sampled_k_points: Some(sampled),
            ..Default::default()
        };
        let corrected = correct_terms(&terms);
        EnergySampleRow::new(
            &GroupKey::polymorph("abc", polymorph),
            k,
            "f.out",
            &terms,
            corrected.as_ref(),
        )
    }

    #[test]
    fn test_process_timing_outcomes() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_timing(dir.path(), "abc", "form1", "0.10", "abc-1.res_ld1.dmaout", 12.0);
        let good = dir
            .path()
            .join("abc/form1/dmacrys/k_value_0.10/abc-1.res_ld1.dmaout");
        let stray = dir.path().join("stray.dmaout");
        fs::write(&stray, " Total run time   3.0\n").unwrap();
        let empty = dir.path().join("abc/form1/dmacrys/k_value_0.10/empty.dmaout");
        fs::write(&empty, "no timings\n").unwrap();

        let mut warnings = Vec::new();
        match process_timing(dir.path(), &good, &mut |m| warnings.push(m)) {
            ProcessResult::Success((key, timings)) => {
                assert_eq!(key.group, GroupKey::polymorph("abc", "form1"));
                assert_eq!(timings.total(), Some(12.0));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            process_timing(dir.path(), &stray, &mut |m| warnings.push(m)),
            ProcessResult::Skipped
        ));
        assert!(matches!(
            process_timing(dir.path(), &empty, &mut |m| warnings.push(m)),
            ProcessResult::Failed(..)
        ));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_execute_writes_run_times() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("crystal-files");
        write_timing(&input, "abc", "form1", "0.10", "abc-1.res_ld1.dmaout", 30.0);
        write_timing(&input, "abc", "form1", "0.10", "abc-1.res_ld2.dmaout", 10.0);
        write_timing(&input, "abc", "form2", "0.10", "abc-2.res_ld1.dmaout", 20.0);
        write_timing(&input, "abc", "form1", "0.20", "abc-1.res_ld1.dmaout", 5.0);

        let energies = dir.path().join("energies.csv");
        export::energy_samples_to_csv(
            &[energy_row("form1", 0.10, 20), energy_row("form2", 0.10, 10)],
            &energies,
        )
        .unwrap();

        let out = dir.path().join("out");
        execute(TimingArgs {
            input,
            energies: Some(energies),
            output: out.clone(),
            pattern: "*.dmaout".to_string(),
        })
        .unwrap();

        let mut rdr = csv::Reader::from_path(out.join("run_times.csv")).unwrap();
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        // crystal, polymorph, k_point, files, total_seconds, ..., sampled_k_points, seconds_per_k_point
        assert_eq!(&records[0][1], "form1");
        assert_eq!(&records[0][3], "2");
        assert_eq!(&records[0][4], "40");
        assert_eq!(&records[0][7], "20");
        assert_eq!(&records[0][8], "2");
        assert_eq!(&records[1][0], "abc");
        assert_eq!(&records[1][8], export::NOT_AVAILABLE);

        let mut rdr = csv::Reader::from_path(out.join("run_time_by_k_point.csv")).unwrap();
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "0.1");
        assert_eq!(&records[0][2], "30");
        assert_eq!(&records[0][4], "2");
        assert_eq!(&records[1][4], export::NOT_AVAILABLE);
    }
}
