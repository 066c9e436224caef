//! # check 子命令实现
//!
//! 扫描计算目录，报告报告文件 (.out) 数量异常的目录：
//! - 含有多个 .out 文件的目录
//! - `structure-files/` 下没有 .out 文件的结构目录
//!
//! ## 依赖关系
//! - 使用 `cli/check.rs` 定义的参数
//! - 使用 `walkdir` 遍历目录

use crate::cli::check::CheckArgs;
use crate::error::{FreerankError, Result};
use crate::utils::output;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 检查结果
#[derive(Debug, Default)]
pub struct CheckReport {
    /// 多于一个 .out 文件的目录：(目录, 数量)
    pub multiple: Vec<(PathBuf, usize)>,
    /// 没有 .out 文件的结构目录
    pub empty: Vec<PathBuf>,
    /// 检查过的目录数
    pub scanned: usize,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.multiple.is_empty() && self.empty.is_empty()
    }
}

fn count_reports(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "out"))
                .count()
        })
        .unwrap_or(0)
}

/// 扫描目录树
pub fn check_tree(root: &Path, structure_dir: &str) -> CheckReport {
    let mut report = CheckReport::default();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
    {
        let dir = entry.path();
        report.scanned += 1;

        let count = count_reports(dir);
        if count > 1 {
            report.multiple.push((dir.to_path_buf(), count));
        }

        let is_structure_dir = dir
            .parent()
            .and_then(|p| p.file_name())
            .is_some_and(|name| name == structure_dir);
        if is_structure_dir && count == 0 {
            report.empty.push(dir.to_path_buf());
        }
    }

    report
}

/// 执行 check
pub fn execute(args: CheckArgs) -> Result<()> {
    output::print_header("Checking Calculation Directories");

    if !args.root.is_dir() {
        return Err(FreerankError::DirectoryNotFound {
            path: args.root.display().to_string(),
        });
    }

    let report = check_tree(&args.root, &args.structure_dir);

    for (dir, count) in &report.multiple {
        output::print_warning(&format!("{} contains {} .out files", dir.display(), count));
    }
    for dir in &report.empty {
        output::print_warning(&format!("{} contains no .out file", dir.display()));
    }

    if report.is_clean() {
        output::print_success(&format!("{} directories checked, no problems", report.scanned));
    } else {
        output::print_done(&format!(
            "{} directories checked: {} with multiple reports, {} without",
            report.scanned,
            report.multiple.len(),
            report.empty.len()
        ));
    }

    Ok(())
}
