//! # 批量执行器
//!
//! 顺序执行批量处理任务。
//!
//! ## 功能
//! - 按输入顺序逐个处理，输出顺序确定
//! - 进度条显示
//! - 错误收集与汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs`, `commands/stats/timing.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条

use crate::utils::progress;

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

/// 单个文件处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult<T> {
    /// 处理成功，携带结果
    Success(T),
    /// 跳过（如文件名不符合约定），原因由处理函数自行报告
    Skipped,
    /// 处理失败
    Failed(String, String), // (文件路径, 错误信息)
}

/// 批量处理结果统计
#[derive(Debug)]
pub struct BatchResult<T> {
    /// 成功结果（保持输入顺序）
    pub outputs: Vec<T>,
    /// 跳过数量
    pub skipped: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
            skipped: 0,
            failures: Vec::new(),
        }
    }
}

impl<T> BatchResult<T> {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult<T>) {
        match result {
            ProcessResult::Success(output) => self.outputs.push(output),
            ProcessResult::Skipped => self.skipped += 1,
            ProcessResult::Failed(path, err) => self.failures.push((path, err)),
        }
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 进度条提示
    message: String,
}

impl BatchRunner {
    /// 创建新的批量执行器
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    /// 逐个处理文件列表
    ///
    /// 处理函数拿到进度条，输出警告前应使用 `pb.suspend`。
    pub fn run<T, F>(&self, files: &[PathBuf], mut processor: F) -> BatchResult<T>
    where
        F: FnMut(&Path, &ProgressBar) -> ProcessResult<T>,
    {
        let pb = progress::create_progress_bar(files.len() as u64, &self.message);

        let mut batch_result = BatchResult::default();
        for file in files {
            batch_result.merge(processor(file.as_path(), &pb));
            pb.inc(1);
        }

        pb.finish_and_clear();
        batch_result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_preserves_order_and_counts() {
        let files: Vec<PathBuf> = ["a.out", "b.txt", "c.out", "d.out"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let result = BatchRunner::new("Testing").run(&files, |path, _| {
            let name = path.display().to_string();
            match path.extension().and_then(|e| e.to_str()) {
                Some("out") if name.starts_with('d') => {
                    ProcessResult::Failed(name, "broken".to_string())
                }
                Some("out") => ProcessResult::Success(name),
                _ => ProcessResult::Skipped,
            }
        });

        assert_eq!(result.outputs, vec!["a.out", "c.out"]);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, "d.out");
    }
}
