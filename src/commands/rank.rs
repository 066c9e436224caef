//! # rank 子命令实现
//!
//! 对每个晶体目录下的候选结构分别按晶格能与校正后自由能排序。
//!
//! ## 功能
//! - 识别晶体目录（或根目录本身即一个晶体）
//! - 读取 structures 表并附加每个结构的自由能报告
//! - 构建原始/新排序表并写出 `<crystal>-ranking.csv`
//! - 终端显示前 N 个结构与 Kendall τ
//!
//! ## 依赖关系
//! - 使用 `cli/rank.rs` 定义的参数
//! - 使用 `parsers/structures.rs`, `parsers/autofree_out.rs`
//! - 使用 `ranking/` 排序与导出
//! - `load_crystal` 与 `find_crystals` 也被 `commands/report.rs` 使用

use crate::batch::subdirectories;
use crate::cli::rank::{LayoutArgs, RankArgs};
use crate::error::{FreerankError, Result};
use crate::models::{EnergyRecord, GroupKey};
use crate::parsers::structures::parse_structures_file;
use crate::parsers::{parse_report_file, ParseDiagnostic};
use crate::ranking::export::{self, NOT_AVAILABLE};
use crate::ranking::stats::kendall_tau_b;
use crate::ranking::GroupRanking;
use crate::utils::{output, progress};

use std::fs;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 一个晶体目录
#[derive(Debug, Clone)]
pub struct CrystalDir {
    pub name: String,
    pub path: PathBuf,
}

/// 读取晶体时产生的非致命问题
#[derive(Debug, Default)]
pub struct LoadWarnings {
    /// structures 表中无法解析的行
    pub skipped_rows: Vec<(usize, String)>,
    /// 没有报告文件的结构 id
    pub missing_reports: Vec<String>,
    /// 无法读取的报告：(结构 id, 错误)
    pub unreadable_reports: Vec<(String, String)>,
    /// 报告中的字段解析问题：(结构 id, 诊断)
    pub diagnostics: Vec<(String, ParseDiagnostic)>,
}

impl LoadWarnings {
    /// 汇总为若干行警告文本
    pub fn messages(&self, crystal: &str) -> Vec<String> {
        let mut messages = Vec::new();
        for (line, reason) in &self.skipped_rows {
            messages.push(format!("{}: skipped structures row {}: {}", crystal, line, reason));
        }
        for (id, err) in &self.unreadable_reports {
            messages.push(format!("{}: could not read report for {}: {}", crystal, id, err));
        }
        for (id, diag) in &self.diagnostics {
            messages.push(format!("{}: {}: {}", crystal, id, diag));
        }
        if !self.missing_reports.is_empty() {
            messages.push(format!(
                "{}: {} structure(s) have no free-energy report",
                crystal,
                self.missing_reports.len()
            ));
        }
        messages
    }
}

/// 找出根目录下的晶体目录；根目录自身含 structures 表时视为单个晶体
pub fn find_crystals(root: &Path, structures_file: &str) -> Result<Vec<CrystalDir>> {
    if !root.is_dir() {
        return Err(FreerankError::DirectoryNotFound {
            path: root.display().to_string(),
        });
    }

    let name_of = |path: &Path| {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string())
    };

    if root.join(structures_file).is_file() {
        let path = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        return Ok(vec![CrystalDir {
            name: name_of(&path),
            path: root.to_path_buf(),
        }]);
    }

    Ok(subdirectories(root)?
        .into_iter()
        .filter(|dir| dir.join(structures_file).is_file())
        .map(|dir| CrystalDir {
            name: name_of(&dir),
            path: dir,
        })
        .collect())
}

/// 结构报告路径：`<crystal>/<structure_dir>/<id>/<id>.out`
pub fn report_path(crystal_dir: &Path, structure_dir: &str, id: &str) -> PathBuf {
    crystal_dir
        .join(structure_dir)
        .join(id)
        .join(format!("{}.out", id))
}

/// 读取一个晶体的全部能量记录并附加振动项
pub fn load_crystal(
    crystal: &CrystalDir,
    layout: &LayoutArgs,
) -> Result<(Vec<EnergyRecord>, LoadWarnings)> {
    let table = parse_structures_file(&crystal.path.join(&layout.structures_file))?;

    let mut warnings = LoadWarnings {
        skipped_rows: table.skipped,
        ..Default::default()
    };

    let mut records = Vec::with_capacity(table.rows.len());
    for row in table.rows {
        let mut record = row.into_record();
        let path = report_path(&crystal.path, &layout.structure_dir, &record.id);

        if !path.is_file() {
            warnings.missing_reports.push(record.id.clone());
        } else {
            match parse_report_file(&path) {
                Ok(parsed) => {
                    record.terms = parsed.terms;
                    warnings.diagnostics.extend(
                        parsed
                            .diagnostics
                            .into_iter()
                            .map(|d| (record.id.clone(), d)),
                    );
                }
                Err(e) => warnings
                    .unreadable_reports
                    .push((record.id.clone(), e.to_string())),
            }
        }

        records.push(record);
    }

    Ok((records, warnings))
}

/// 原始与新排名之间的 Kendall τ（只统计两张表中都有排名的结构）
pub fn ranking_kendall(ranking: &GroupRanking) -> Option<f64> {
    let (original, new): (Vec<usize>, Vec<usize>) = ranking
        .corrected
        .entries()
        .iter()
        .filter_map(|e| {
            ranking
                .original
                .rank_of(&e.record.id)
                .map(|old| (old, e.rank))
        })
        .unzip();
    kendall_tau_b(&original, &new)
}

/// 终端表格行
#[derive(Debug, Clone, Tabled)]
struct TopRow {
    #[tabled(rename = "New")]
    new_rank: usize,
    #[tabled(rename = "Original")]
    original_rank: String,
    #[tabled(rename = "Structure")]
    id: String,
    #[tabled(rename = "Lattice E")]
    energy: String,
    #[tabled(rename = "Free E")]
    free_energy: String,
    #[tabled(rename = "New E")]
    new_energy: String,
}

fn top_rows(ranking: &GroupRanking, n: usize) -> Vec<TopRow> {
    let fmt = |v: Option<f64>| {
        v.map(|x| format!("{:.4}", x))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };

    ranking
        .corrected
        .entries()
        .iter()
        .take(n)
        .map(|e| TopRow {
            new_rank: e.rank,
            original_rank: ranking
                .original
                .rank_of(&e.record.id)
                .map(|r| r.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            id: e.record.id.clone(),
            energy: format!("{:.4}", e.record.lattice_energy),
            free_energy: fmt(ranking.free_energy(&e.record)),
            new_energy: format!("{:.4}", e.energy),
        })
        .collect()
}

/// 执行 rank
pub fn execute(args: RankArgs) -> Result<()> {
    output::print_header("Ranking Structures by Free Energy");

    let crystals = find_crystals(&args.layout.root, &args.layout.structures_file)?;
    if crystals.is_empty() {
        output::print_warning(&format!(
            "No crystal directories with '{}' found under '{}'",
            args.layout.structures_file,
            args.layout.root.display()
        ));
        return Ok(());
    }

    fs::create_dir_all(&args.output).map_err(|e| FreerankError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    output::print_info(&format!(
        "Found {} crystal(s), ranking by lattice energy + {} [{}]",
        crystals.len(),
        args.layout.term.variant(),
        args.layout.term
    ));

    let mut written = 0usize;
    for crystal in &crystals {
        let spinner = progress::create_spinner(&format!("Ranking {}", crystal.name));
        let loaded = load_crystal(crystal, &args.layout);
        spinner.finish_and_clear();

        let (records, warnings) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                output::print_warning(&format!("Skipping {}: {}", crystal.name, e));
                continue;
            }
        };
        for msg in warnings.messages(&crystal.name) {
            output::print_warning(&msg);
        }

        let ranking = match GroupRanking::build(
            GroupKey::crystal(&crystal.name),
            &records,
            args.layout.term.variant(),
            args.common_only,
        ) {
            Ok(ranking) => ranking,
            Err(e @ FreerankError::DuplicateId { .. }) => {
                output::print_warning(&format!("Skipping {}: {}", crystal.name, e));
                continue;
            }
            Err(e) => return Err(e),
        };

        let output_path = args.output.join(format!("{}-ranking.csv", crystal.name));
        export::ranking_to_csv(&ranking, &output_path)?;
        written += 1;

        output::print_header(&format!(
            "{}: top {} of {} ranked ({} unranked)",
            crystal.name,
            args.top_n.min(ranking.corrected.len()),
            ranking.corrected.len(),
            ranking.corrected.unranked().len()
        ));
        if !ranking.corrected.is_empty() {
            println!("{}", Table::new(top_rows(&ranking, args.top_n)));
        }
        match ranking_kendall(&ranking) {
            Some(tau) => output::print_info(&format!("Kendall tau (original vs new): {:.4}", tau)),
            None => output::print_info("Kendall tau (original vs new): n/a"),
        }
        output::print_written("Ranking", &output_path.display().to_string());
    }

    output::print_separator();
    output::print_done(&format!(
        "Wrote {} of {} ranking file(s)",
        written,
        crystals.len()
    ));

    Ok(())
}
