//! # extract 子命令实现
//!
//! 批量解析自由能报告，应用声子数缩放校正，写出合并能量表。
//!
//! ## 功能
//! - 收集匹配的报告文件
//! - 从文件名/父目录推导晶体、多晶型和 k 值
//! - 解析报告并计算三种校正能量
//! - 汇总成功/跳过/失败数量
//!
//! ## 依赖关系
//! - 使用 `cli/extract.rs` 定义的参数
//! - 使用 `batch/` 收集与执行
//! - 使用 `parsers/naming.rs`, `parsers/autofree_out.rs`
//! - 使用 `ranking/correction.rs`, `ranking/export.rs`

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::extract::ExtractArgs;
use crate::error::{FreerankError, Result};
use crate::parsers::{parse_report_file, sample_key_from_path, EnergySampleRow};
use crate::ranking::correction::correct_terms;
use crate::ranking::export;
use crate::utils::output;

use std::path::Path;

/// 处理单个报告
fn process_report(path: &Path, warn: &mut dyn FnMut(String)) -> ProcessResult<EnergySampleRow> {
    let display = path.display().to_string();

    let key = match sample_key_from_path(path) {
        Ok(key) => key,
        Err(e) => {
            warn(format!("{}", e));
            return ProcessResult::Skipped;
        }
    };

    let parsed = match parse_report_file(path) {
        Ok(parsed) => parsed,
        Err(e) => return ProcessResult::Failed(display, e.to_string()),
    };

    for diag in &parsed.diagnostics {
        warn(format!("{}: {}", display, diag));
    }

    if parsed.terms.is_empty() {
        let err = FreerankError::ParseError {
            format: "free-energy report".to_string(),
            path: display.clone(),
            reason: "no recognised energy fields".to_string(),
        };
        return ProcessResult::Failed(display, err.to_string());
    }

    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| display.clone());
    let corrected = correct_terms(&parsed.terms);

    ProcessResult::Success(EnergySampleRow::new(
        &key.group,
        key.k_point,
        file,
        &parsed.terms,
        corrected.as_ref(),
    ))
}

/// 执行 extract
pub fn execute(args: ExtractArgs) -> Result<()> {
    output::print_header("Extracting Free-Energy Reports");

    if !args.input.exists() {
        return Err(FreerankError::DirectoryNotFound {
            path: args.input.display().to_string(),
        });
    }

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        return Err(FreerankError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }

    output::print_info(&format!(
        "Found {} report(s) matching '{}'",
        files.len(),
        args.pattern
    ));

    let result = BatchRunner::new("Parsing").run(&files, |path, pb| {
        process_report(path, &mut |msg| pb.suspend(|| output::print_warning(&msg)))
    });

    let mut rows = result.outputs;
    rows.sort_by(|a, b| {
        (&a.crystal, &a.polymorph)
            .cmp(&(&b.crystal, &b.polymorph))
            .then(a.k_point.total_cmp(&b.k_point))
            .then(a.file.cmp(&b.file))
    });

    if !rows.is_empty() {
        export::energy_samples_to_csv(&rows, &args.output)?;
        output::print_written("Energies", &args.output.display().to_string());
    }

    output::print_separator();
    output::print_done(&format!(
        "{} parsed, {} skipped, {} failed (of {})",
        rows.len(),
        result.skipped,
        result.failures.len(),
        rows.len() + result.skipped + result.failures.len()
    ));

    for (path, err) in result.failures.iter().take(args.show_failures) {
        output::print_error(&format!("{}: {}", path, err));
    }
    if result.failures.len() > args.show_failures {
        output::print_skip(&format!(
            "... and {} more failure(s)",
            result.failures.len() - args.show_failures
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnergyVariant;
    use crate::parsers::energy_csv::read_energy_csv;
    use std::fs;

    const REPORT: &str = "\
Neat vibrational energy = 100.0
Debye contribution to vibrational energy: 5.0
Epanechnikov KDE vibrational energy: 95.0
Total number of phonons: 10
";

    #[test]
    fn test_process_report_outcomes() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let good = dir.path().join("cumjoj_form1_0.12.out");
        let empty = dir.path().join("cumjoj_form2_0.12.out");
        let unnamed = dir.path().join("report.out");
        fs::write(&good, REPORT).unwrap();
        fs::write(&empty, "nothing here\n").unwrap();
        fs::write(&unnamed, REPORT).unwrap();

        let mut warnings = Vec::new();
        match process_report(&good, &mut |m| warnings.push(m)) {
            ProcessResult::Success(row) => {
                assert_eq!(row.crystal, "cumjoj");
                assert_eq!(row.polymorph.as_deref(), Some("form1"));
                assert_eq!(row.k_point, 0.12);
                let e = row.energy(EnergyVariant::WithDebyeAndKde).unwrap();
                assert!((e - 71.5).abs() < 1e-9);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            process_report(&empty, &mut |m| warnings.push(m)),
            ProcessResult::Failed(..)
        ));
        assert!(matches!(
            process_report(&unnamed, &mut |m| warnings.push(m)),
            ProcessResult::Skipped
        ));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_execute_writes_sorted_csv() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("reports");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("abc_form2_0.10.out"), REPORT).unwrap();
        fs::write(input.join("abc_form1_0.12.out"), REPORT).unwrap();
        fs::write(input.join("abc_form1_0.10.out"), REPORT).unwrap();
        let output = dir.path().join("energies.csv");

        execute(ExtractArgs {
            input,
            output: output.clone(),
            pattern: "*.out".to_string(),
            recursive: false,
            show_failures: 5,
        })
        .unwrap();

        let (rows, skipped) = read_energy_csv(&output).unwrap();
        assert!(skipped.is_empty());
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.polymorph.clone().unwrap_or_default(), r.k_point))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("form1".to_string(), 0.10),
                ("form1".to_string(), 0.12),
                ("form2".to_string(), 0.10),
            ]
        );
    }
}
