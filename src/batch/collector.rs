//! # 文件收集器
//!
//! 根据输入路径和模式收集待处理文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔多模式）
//! - 递归目录搜索
//! - 输出按路径排序，保证重复运行结果一致
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs`, `commands/stats/kendall.rs`, `commands/stats/timing.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{FreerankError, Result};

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<glob::Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器（默认匹配所有文件）
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| {
                    FreerankError::InvalidArgument(format!("Invalid pattern '{}': {}", p, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    /// 检查文件是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }

        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns.iter().any(|p| p.matches(filename))
    }
}

/// 列出目录下的直接子目录（按名称排序）
pub fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| FreerankError::FileReadError {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_with_patterns_and_recursion() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join("k_value_0.12")).unwrap();
        fs::write(root.join("a_form1_0.10.out"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("k_value_0.12").join("a_form2.out"), "").unwrap();

        let flat = FileCollector::new(root.to_path_buf())
            .with_pattern("*.out")
            .unwrap()
            .collect();
        assert_eq!(flat.len(), 1);

        let deep = FileCollector::new(root.to_path_buf())
            .with_pattern("*.out, *.txt")
            .unwrap()
            .recursive(true)
            .collect();
        assert_eq!(deep.len(), 3);
        let mut sorted = deep.clone();
        sorted.sort();
        assert_eq!(deep, sorted);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(FileCollector::new(PathBuf::from(".")).with_pattern("[").is_err());
    }

    #[test]
    fn test_subdirectories_sorted() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("c"), "").unwrap();

        let dirs = subdirectories(dir.path()).unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
