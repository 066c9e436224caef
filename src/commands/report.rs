//! # report 子命令实现
//!
//! 对实验观测结构给出校正前后的排名变化。
//!
//! ## 功能
//! - 读取观测结构列表
//! - 按 id 前缀将观测结构分配到晶体
//! - 每个晶体构建原始/新排序表（原始排序只含有自由能的结构）
//! - 写出文本摘要与按 refcode 排序的 CSV，终端打印统计
//!
//! ## 依赖关系
//! - 使用 `cli/report.rs` 定义的参数
//! - 使用 `commands/rank.rs` 的晶体读取
//! - 使用 `ranking/change.rs`, `ranking/export.rs`

use crate::cli::rank::LayoutArgs;
use crate::cli::report::ReportArgs;
use crate::commands::rank::{find_crystals, load_crystal, CrystalDir};
use crate::error::{FreerankError, Result};
use crate::models::{GroupKey, ObservedStructure, RankClassification};
use crate::parsers::observed::parse_observed_file;
use crate::ranking::change::format_percentage;
use crate::ranking::export::{self, RankChangeRow};
use crate::ranking::{GroupRanking, RankChangeReport, RankChangeSummary};
use crate::utils::output;

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;

const CLASSES: [RankClassification; 3] = [
    RankClassification::Improved,
    RankClassification::Worsened,
    RankClassification::Unchanged,
];

/// 报告构建结果
#[derive(Debug, Default)]
pub struct ReportOutput {
    pub report: RankChangeReport,
    pub rows: Vec<RankChangeRow>,
    pub text: String,
}

/// 属于某个晶体的观测结构（id 以 `<crystal>-` 开头）
fn observed_for<'a>(observed: &'a [ObservedStructure], crystal: &str) -> Vec<&'a ObservedStructure> {
    let prefix = format!("{}-", crystal);
    observed
        .iter()
        .filter(|o| o.structure_id.starts_with(&prefix))
        .collect()
}

/// 为一个晶体生成排名变化并追加到输出
fn append_crystal(
    out: &mut ReportOutput,
    crystal: &str,
    ranking: &GroupRanking,
    observed: &[&ObservedStructure],
) {
    let report = RankChangeReport::compare(
        &ranking.original,
        &ranking.corrected,
        observed.iter().map(|o| o.structure_id.as_str()),
    );

    let _ = writeln!(out.text, "{}", crystal);
    for obs in observed {
        let change = report.changes.iter().find(|c| c.id == obs.structure_id);
        let original = ranking.original.get(&obs.structure_id);
        let corrected = ranking.corrected.get(&obs.structure_id);
        match (change, original, corrected) {
            (Some(change), Some(original), Some(corrected)) => {
                let energy = original.energy;
                let new_energy = corrected.energy;
                let _ = writeln!(
                    out.text,
                    "  {} ({}): {} -> {} ({}), energy {:.4} -> {:.4}",
                    obs.structure_id,
                    obs.refcode,
                    change.original_rank,
                    change.new_rank,
                    change.classification,
                    energy,
                    new_energy
                );
                out.rows.push(RankChangeRow {
                    refcode: obs.refcode.clone(),
                    id: change.id.clone(),
                    original_rank: change.original_rank,
                    new_rank: change.new_rank,
                    delta: change.delta,
                    classification: change.classification.to_string(),
                    observed_rank: obs.observed_rank,
                    energy,
                    new_energy,
                    source: crystal.to_string(),
                });
            }
            _ => {
                let _ = writeln!(
                    out.text,
                    "  {} ({}): (not found in rankings)",
                    obs.structure_id, obs.refcode
                );
            }
        }
    }
    let _ = writeln!(out.text);

    out.report.merge(report);
}

/// 读取晶体并构建排序表；读取时的非致命问题交给 `warn`
fn load_ranking(
    crystal: &CrystalDir,
    layout: &LayoutArgs,
    warn: &mut dyn FnMut(String),
) -> Result<GroupRanking> {
    let (records, warnings) = load_crystal(crystal, layout)?;
    for msg in warnings.messages(&crystal.name) {
        warn(msg);
    }
    GroupRanking::build(
        GroupKey::crystal(&crystal.name),
        &records,
        layout.term.variant(),
        true,
    )
}

/// 统计段文本
pub fn summary_block(summary: &RankChangeSummary) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Summary");
    let _ = writeln!(text, "  Observed structures found: {}", summary.found());
    for class in CLASSES {
        let _ = writeln!(
            text,
            "  {}: {} ({})",
            class,
            summary.count(class),
            format_percentage(summary.percentage(class))
        );
    }
    let _ = writeln!(text, "  not found: {}", summary.not_found);
    text
}

/// 执行 report
pub fn execute(args: ReportArgs) -> Result<()> {
    output::print_header("Rank Changes of Observed Structures");

    if !args.observed.is_file() {
        return Err(FreerankError::FileNotFound {
            path: args.observed.display().to_string(),
        });
    }
    let observed = parse_observed_file(&args.observed)?;
    output::print_info(&format!(
        "Loaded {} observed structure(s) from '{}'",
        observed.len(),
        args.observed.display()
    ));

    let crystals = find_crystals(&args.layout.root, &args.layout.structures_file)?;

    let mut out = ReportOutput::default();
    let mut matched: HashSet<String> = HashSet::new();

    for crystal in &crystals {
        let observed_here = observed_for(&observed, &crystal.name);
        if observed_here.is_empty() {
            continue;
        }

        let ranking = load_ranking(crystal, &args.layout, &mut |msg| output::print_warning(&msg));
        let ranking = match ranking {
            Ok(ranking) => ranking,
            Err(e) => {
                output::print_warning(&format!("Skipping {}: {}", crystal.name, e));
                continue;
            }
        };

        matched.extend(observed_here.iter().map(|o| o.structure_id.clone()));
        append_crystal(&mut out, &crystal.name, &ranking, &observed_here);
    }

    // 没有对应晶体（或晶体被跳过）的观测结构
    let orphans: Vec<&ObservedStructure> = observed
        .iter()
        .filter(|o| !matched.contains(&o.structure_id))
        .collect();
    if !orphans.is_empty() {
        let _ = writeln!(out.text, "Unmatched");
        for obs in &orphans {
            let _ = writeln!(
                out.text,
                "  {} ({}): (not found in rankings)",
                obs.structure_id, obs.refcode
            );
            out.report.not_found.push(obs.structure_id.clone());
        }
        let _ = writeln!(out.text);
    }

    let summary = out.report.summary();
    out.text.push_str(&summary_block(&summary));

    fs::write(&args.summary, &out.text).map_err(|e| FreerankError::FileWriteError {
        path: args.summary.display().to_string(),
        source: e,
    })?;
    output::print_written("Summary", &args.summary.display().to_string());

    out.rows.sort_by(|a, b| a.refcode.cmp(&b.refcode).then(a.id.cmp(&b.id)));
    export::rank_changes_to_csv(&out.rows, &args.output)?;
    output::print_written("Rank changes", &args.output.display().to_string());

    output::print_separator();
    for class in CLASSES {
        println!(
            "  {:<10} {:>4}  {}",
            output::colorize_classification(class),
            summary.count(class),
            format_percentage(summary.percentage(class))
        );
    }
    println!("  {:<10} {:>4}", "not found", summary.not_found);
    output::print_done(&format!(
        "{} of {} observed structure(s) found in rankings",
        summary.found(),
        summary.found() + summary.not_found
    ));

    Ok(())
}
