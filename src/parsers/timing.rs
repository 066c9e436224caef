//! # DMACRYS 计时输出解析器
//!
//! 从 `.dmaout` 文件末尾的计时表中读取各程序段的 CPU 时间（秒）。
//!
//! ## 计时表格式（节选）
//! ```text
//!  Time to set things up                          0.52
//!  Reciprocal space part of Ewald sum            12.40
//!  Total run time                                31.87
//! ```
//!
//! 数值取本行最后一个空白分隔的字段。同一程序段出现多次时保留第一次。
//!
//! ## 依赖关系
//! - 被 `commands/stats/timing.rs` 使用

use crate::error::{FreerankError, Result};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 计时表中的程序段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimingSection {
    Setup,
    ReciprocalEwald,
    RealEwald,
    ShortRange,
    Energy,
    FirstDerivative,
    SecondDerivative,
    Other,
    Total,
}

impl TimingSection {
    /// 按计时表中的出现顺序
    pub const ALL: [TimingSection; 9] = [
        TimingSection::Setup,
        TimingSection::ReciprocalEwald,
        TimingSection::RealEwald,
        TimingSection::ShortRange,
        TimingSection::Energy,
        TimingSection::FirstDerivative,
        TimingSection::SecondDerivative,
        TimingSection::Other,
        TimingSection::Total,
    ];

    /// 计时表中的标签
    pub fn label(self) -> &'static str {
        match self {
            TimingSection::Setup => "Time to set things up",
            TimingSection::ReciprocalEwald => "Reciprocal space part of Ewald sum",
            TimingSection::RealEwald => "Real space part of Ewald sum",
            TimingSection::ShortRange => "Short range potential calculation",
            TimingSection::Energy => "Energy calculation",
            TimingSection::FirstDerivative => "First derivative chain rule",
            TimingSection::SecondDerivative => "Second derivative chain rule",
            TimingSection::Other => "All other program sections",
            TimingSection::Total => "Total run time",
        }
    }

    /// CSV 列名
    pub fn column(self) -> &'static str {
        match self {
            TimingSection::Setup => "setup_seconds",
            TimingSection::ReciprocalEwald => "reciprocal_ewald_seconds",
            TimingSection::RealEwald => "real_ewald_seconds",
            TimingSection::ShortRange => "short_range_seconds",
            TimingSection::Energy => "energy_seconds",
            TimingSection::FirstDerivative => "first_derivative_seconds",
            TimingSection::SecondDerivative => "second_derivative_seconds",
            TimingSection::Other => "other_seconds",
            TimingSection::Total => "total_run_seconds",
        }
    }
}

impl std::fmt::Display for TimingSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 单次运行各程序段的 CPU 时间
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunTimings {
    seconds: BTreeMap<TimingSection, f64>,
}

impl RunTimings {
    pub fn get(&self, section: TimingSection) -> Option<f64> {
        self.seconds.get(&section).copied()
    }

    /// "Total run time"
    pub fn total(&self) -> Option<f64> {
        self.get(TimingSection::Total)
    }

    pub fn is_empty(&self) -> bool {
        self.seconds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimingSection, f64)> + '_ {
        self.seconds.iter().map(|(s, v)| (*s, *v))
    }
}

/// 标签存在但时间无法解析
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingDiagnostic {
    pub line: usize,
    pub section: TimingSection,
    pub text: String,
}

impl std::fmt::Display for TimingDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: could not parse '{}' time from '{}'",
            self.line, self.section, self.text
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedTimings {
    pub timings: RunTimings,
    pub diagnostics: Vec<TimingDiagnostic>,
}

/// 解析计时文件
pub fn parse_timing_file(path: &Path) -> Result<ParsedTimings> {
    let content = fs::read_to_string(path).map_err(|e| FreerankError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(parse_timings(&content))
}

pub fn parse_timings(content: &str) -> ParsedTimings {
    let mut parsed = ParsedTimings::default();

    for (idx, line) in content.lines().enumerate() {
        let Some(section) = TimingSection::ALL
            .into_iter()
            .find(|s| line.contains(s.label()))
        else {
            continue;
        };

        if parsed.timings.seconds.contains_key(&section) {
            continue;
        }

        let last = line.split_whitespace().last().unwrap_or("");
        match last.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                parsed.timings.seconds.insert(section, value);
            }
            _ => parsed.diagnostics.push(TimingDiagnostic {
                line: idx + 1,
                section,
                text: line.trim().to_string(),
            }),
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMINGS: &str = "\
 DMACRYS run finished

 Time to set things up                          0.52
 Reciprocal space part of Ewald sum            12.40
 Real space part of Ewald sum                   6.10
 Short range potential calculation              4.25
 Energy calculation                             0.80
 First derivative chain rule                    2.00
 Second derivative chain rule                   5.30
 All other program sections                     0.50
 Total run time                                31.87
";

    #[test]
    fn test_parse_all_sections() {
        let parsed = parse_timings(TIMINGS);
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.timings.iter().count(), 9);
        assert_eq!(parsed.timings.get(TimingSection::ReciprocalEwald), Some(12.40));
        assert_eq!(parsed.timings.get(TimingSection::RealEwald), Some(6.10));
        assert_eq!(parsed.timings.get(TimingSection::SecondDerivative), Some(5.30));
        assert_eq!(parsed.timings.total(), Some(31.87));
    }

    #[test]
    fn test_first_occurrence_kept_and_bad_value_reported() {
        let content = "\
 Total run time        10.0
 Total run time        99.0
 Energy calculation    ****
";
        let parsed = parse_timings(content);
        assert_eq!(parsed.timings.total(), Some(10.0));
        assert_eq!(parsed.timings.get(TimingSection::Energy), None);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].line, 3);
        assert_eq!(parsed.diagnostics[0].section, TimingSection::Energy);
    }

    #[test]
    fn test_no_timing_table() {
        let parsed = parse_timings("nothing to see\n");
        assert!(parsed.timings.is_empty());
        assert!(parsed.diagnostics.is_empty());
    }
}
