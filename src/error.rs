//! # 统一错误处理模块
//!
//! 定义 freerank 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - 输入缺失：文件/目录/列不存在，跳过该单元，批处理继续
//! - 解析错误：数值字段无法解析时不会走到这里（字段视为缺失）
//! - 数据完整性：同组内重复 id、多晶型数量不匹配
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// freerank 统一错误类型
#[derive(Error, Debug)]
pub enum FreerankError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Cannot derive grouping key from file name: {0}")]
    UnrecognizedFileName(String),

    // ─────────────────────────────────────────────────────────────
    // 数据完整性错误
    // ─────────────────────────────────────────────────────────────
    #[error("Duplicate structure id '{id}' in group {group}")]
    DuplicateId { id: String, group: String },

    #[error("Expected {expected} polymorphs for {group} at k-point {k_point}, found {found}")]
    PolymorphCountMismatch {
        group: String,
        k_point: f64,
        expected: usize,
        found: usize,
    },

    #[error("{count} samples for polymorph '{polymorph}' of {group} at k-point {k_point}")]
    DuplicateSample {
        group: String,
        polymorph: String,
        k_point: f64,
        count: usize,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, FreerankError>;
