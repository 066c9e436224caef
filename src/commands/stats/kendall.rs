//! # Kendall τ 统计
//!
//! 对目录中的每个 `<crystal>-ranking.csv`，计算原始排名与新排名
//! 位置序之间的 Kendall τ-b。
//!
//! ## 依赖关系
//! - 使用 `cli/stats.rs` 定义的参数
//! - 使用 `parsers/ranking_csv.rs`, `ranking/stats.rs`

use crate::batch::FileCollector;
use crate::cli::stats::KendallArgs;
use crate::error::{FreerankError, Result};
use crate::parsers::ranking_csv::{read_ranking_csv, RankingRow};
use crate::ranking::export::{self, NOT_AVAILABLE};
use crate::ranking::stats::{kendall_tau_b, sorted_positions};
use crate::utils::output;

use std::path::Path;

const RANKING_SUFFIX: &str = "-ranking";

/// 由排序表计算 τ；只使用两个排名都存在的行
pub fn kendall_from_rows(rows: &[RankingRow]) -> Option<f64> {
    let (original, new): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .filter_map(|r| Some((r.original_rank?, r.new_rank?)))
        .unzip();

    kendall_tau_b(&sorted_positions(&original), &sorted_positions(&new))
}

fn molecule_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    stem.strip_suffix(RANKING_SUFFIX)
        .map(str::to_string)
        .unwrap_or(stem)
}

/// 执行 kendall
pub fn execute(args: KendallArgs) -> Result<()> {
    output::print_header("Kendall Tau Between Rankings");

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

    let mut results: Vec<(String, Option<f64>)> = Vec::new();
    for file in &files {
        let molecule = molecule_name(file);
        match read_ranking_csv(file) {
            Ok(rows) => {
                let tau = kendall_from_rows(&rows);
                output::print_info(&format!(
                    "{:<20} {}",
                    molecule,
                    tau.map(|t| format!("{:.4}", t))
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
                ));
                results.push((molecule, tau));
            }
            Err(e) => output::print_warning(&format!("Skipping {}: {}", file.display(), e)),
        }
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    export::kendall_to_csv(&results, &args.output)?;
    output::print_written("Kendall tau", &args.output.display().to_string());
    output::print_done(&format!("{} ranking file(s) processed", results.len()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, original: Option<usize>, new: Option<usize>) -> RankingRow {
        RankingRow {
            id: id.to_string(),
            original_rank: original,
            new_rank: new,
        }
    }

    #[test]
    fn test_identical_ranks() {
        let rows = vec![
            row("a", Some(1), Some(1)),
            row("b", Some(2), Some(2)),
            row("c", Some(3), Some(3)),
        ];
        assert_eq!(kendall_from_rows(&rows), Some(1.0));
    }

    #[test]
    fn test_unranked_rows_are_ignored() {
        let rows = vec![
            row("a", Some(1), Some(2)),
            row("b", Some(2), Some(1)),
            row("c", Some(3), None),
        ];
        assert_eq!(kendall_from_rows(&rows), Some(-1.0));
    }

    #[test]
    fn test_single_ranked_row_is_undefined() {
        let rows = vec![row("a", Some(1), Some(1)), row("b", None, Some(2))];
        assert_eq!(kendall_from_rows(&rows), None);
    }

    #[test]
    fn test_molecule_name() {
        assert_eq!(molecule_name(Path::new("out/izijoq-ranking.csv")), "izijoq");
        assert_eq!(molecule_name(Path::new("other.csv")), "other");
    }
}
