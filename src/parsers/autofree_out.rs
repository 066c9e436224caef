//! # AutoFree .out 报告解析器
//!
//! 从晶格动力学报告文本中提取振动能各项、声子数与 k 点数。
//!
//! ## 报告格式（节选）
//! ```text
//! Total number of sampled unique k-points: 27
//! Total number of phonons is: 432
//! Neat vibrational energy = 152.318 kJ/mol
//! Debye contribution to vibrational energy: -1.204 kJ/mol
//! Epanechnikov KDE vibrational energy: 148.771 kJ/mol
//! ```
//!
//! 同一字段在语料中有 `=` 与 `:` 两种写法，两者都匹配。
//! 数值无法解析时字段保持缺失并记录诊断信息，不会返回错误。
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs`, `commands/rank.rs` 使用
//! - 使用 `models/energy.rs`

use crate::error::{FreerankError, Result};
use crate::models::VibrationalTerms;

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// 报告中可识别的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    NeatVibrationalEnergy,
    DebyeContribution,
    KdeVibrationalEnergy,
    PhononCount,
    SampledKPoints,
}

impl std::fmt::Display for ReportField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportField::NeatVibrationalEnergy => write!(f, "Neat vibrational energy"),
            ReportField::DebyeContribution => write!(f, "Debye contribution to vibrational energy"),
            ReportField::KdeVibrationalEnergy => write!(f, "Epanechnikov KDE vibrational energy"),
            ReportField::PhononCount => write!(f, "Total number of phonons"),
            ReportField::SampledKPoints => write!(f, "Total number of sampled unique k-points"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Punctuation {
    Equals,
    Colon,
}

impl Punctuation {
    fn as_char(self) -> char {
        match self {
            Punctuation::Equals => '=',
            Punctuation::Colon => ':',
        }
    }
}

struct LabelSpec {
    label: &'static str,
    punctuation: Punctuation,
    field: ReportField,
}

// 较长的标签排在其前缀之前
const LABELS: &[LabelSpec] = &[
    LabelSpec {
        label: "Neat vibrational energy",
        punctuation: Punctuation::Equals,
        field: ReportField::NeatVibrationalEnergy,
    },
    LabelSpec {
        label: "Neat vibrational energy",
        punctuation: Punctuation::Colon,
        field: ReportField::NeatVibrationalEnergy,
    },
    LabelSpec {
        label: "Debye contribution to vibrational energy",
        punctuation: Punctuation::Colon,
        field: ReportField::DebyeContribution,
    },
    LabelSpec {
        label: "Debye contribution to vibrational energy",
        punctuation: Punctuation::Equals,
        field: ReportField::DebyeContribution,
    },
    LabelSpec {
        label: "Epanechnikov KDE vibrational energy",
        punctuation: Punctuation::Colon,
        field: ReportField::KdeVibrationalEnergy,
    },
    LabelSpec {
        label: "Epanechnikov KDE vibrational energy",
        punctuation: Punctuation::Equals,
        field: ReportField::KdeVibrationalEnergy,
    },
    LabelSpec {
        label: "Total number of phonons is",
        punctuation: Punctuation::Colon,
        field: ReportField::PhononCount,
    },
    LabelSpec {
        label: "Total number of phonons",
        punctuation: Punctuation::Colon,
        field: ReportField::PhononCount,
    },
    LabelSpec {
        label: "Total number of sampled unique k-points",
        punctuation: Punctuation::Colon,
        field: ReportField::SampledKPoints,
    },
];

/// 标签存在但数值无法解析时的诊断信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1 起始的行号
    pub line: usize,
    pub field: ReportField,
    /// 标点之后的原始文本
    pub text: String,
}

impl std::fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: could not parse '{}' from '{}'",
            self.line, self.field, self.text
        )
    }
}

/// 单个报告的解析结果
#[derive(Debug, Clone, Default)]
pub struct ParsedReport {
    pub terms: VibrationalTerms,
    pub diagnostics: Vec<ParseDiagnostic>,
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("valid number pattern")
    })
}

/// 解析报告文件
pub fn parse_report_file(path: &Path) -> Result<ParsedReport> {
    let content = fs::read_to_string(path).map_err(|e| FreerankError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(parse_report(&content))
}

/// 从字符串内容解析报告（单遍扫描）
pub fn parse_report(content: &str) -> ParsedReport {
    let mut report = ParsedReport::default();

    for (idx, line) in content.lines().enumerate() {
        let Some((spec, value)) = match_label(line) else {
            continue;
        };

        if is_set(&report.terms, spec.field) {
            continue;
        }

        if !apply_value(&mut report.terms, spec.field, value) {
            report.diagnostics.push(ParseDiagnostic {
                line: idx + 1,
                field: spec.field,
                text: value.trim().to_string(),
            });
        }
    }

    report
}

/// 找到本行匹配的第一个标签，返回标点之后的文本
fn match_label(line: &str) -> Option<(&'static LabelSpec, &str)> {
    for spec in LABELS {
        if let Some(pos) = line.find(spec.label) {
            let rest = line[pos + spec.label.len()..].trim_start();
            if let Some(value) = rest.strip_prefix(spec.punctuation.as_char()) {
                return Some((spec, value));
            }
        }
    }
    None
}

fn is_set(terms: &VibrationalTerms, field: ReportField) -> bool {
    match field {
        ReportField::NeatVibrationalEnergy => terms.neat_vibrational_energy.is_some(),
        ReportField::DebyeContribution => terms.debye_contribution.is_some(),
        ReportField::KdeVibrationalEnergy => terms.kde_vibrational_energy.is_some(),
        ReportField::PhononCount => terms.phonon_count.is_some(),
        ReportField::SampledKPoints => terms.sampled_k_points.is_some(),
    }
}

/// 写入字段，返回是否解析成功
fn apply_value(terms: &mut VibrationalTerms, field: ReportField, value: &str) -> bool {
    let token = value.split_whitespace().next().unwrap_or("");

    match field {
        ReportField::PhononCount => {
            terms.phonon_count = token.parse().ok();
            terms.phonon_count.is_some()
        }
        ReportField::SampledKPoints => {
            terms.sampled_k_points = token.parse().ok();
            terms.sampled_k_points.is_some()
        }
        ReportField::NeatVibrationalEnergy => {
            terms.neat_vibrational_energy = parse_float_token(token);
            terms.neat_vibrational_energy.is_some()
        }
        ReportField::DebyeContribution => {
            terms.debye_contribution = parse_float_token(token);
            terms.debye_contribution.is_some()
        }
        ReportField::KdeVibrationalEnergy => {
            terms.kde_vibrational_energy = parse_float_token(token);
            terms.kde_vibrational_energy.is_some()
        }
    }
}

/// 取记号开头的数值部分（允许 `12.5kJ/mol` 这类粘连单位）
fn parse_float_token(token: &str) -> Option<f64> {
    number_pattern()
        .find(token)
        .and_then(|m| m.as_str().parse().ok())
}
