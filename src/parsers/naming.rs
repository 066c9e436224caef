//! # 文件名约定
//!
//! 从 k 点收敛计算的报告路径推导分组键与 k 值：
//! - `<crystal>_<polymorph>_<k>[_...].out`，`<k>` 可为 `0.12`、`k-value-0.12`、`k0.12`
//! - 文件名少于三段时，从父目录名（如 `k_value_0.12`）读取 k 值
//! - 计时文件按目录布局：`<root>/<crystal>/<polymorph>/.../<k 目录>/<file>.dmaout`
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs`, `commands/stats/timing.rs` 使用
//! - 使用 `models/energy.rs`

use crate::error::{FreerankError, Result};
use crate::models::GroupKey;

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// 单个报告对应的分组键与 k 值
#[derive(Debug, Clone, PartialEq)]
pub struct SampleKey {
    pub group: GroupKey,
    pub k_point: f64,
}

fn k_value_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?|\.\d+").expect("valid k-value pattern"))
}

/// 取字符串中最后一个数值
fn trailing_number(s: &str) -> Option<f64> {
    k_value_pattern()
        .find_iter(s)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

/// 取字符串中第一个数值
fn leading_number(s: &str) -> Option<f64> {
    k_value_pattern()
        .find(s)
        .and_then(|m| m.as_str().parse().ok())
}

/// 从报告路径推导分组键
pub fn sample_key_from_path(path: &Path) -> Result<SampleKey> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| FreerankError::UnrecognizedFileName(path.display().to_string()))?;

    let parts: Vec<&str> = stem.split('_').filter(|p| !p.is_empty()).collect();

    if parts.len() >= 3 {
        if let Some(k_point) = leading_number(parts[2]) {
            return Ok(SampleKey {
                group: GroupKey::polymorph(parts[0], parts[1]),
                k_point,
            });
        }
    }

    if parts.len() >= 2 {
        let parent_k = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .and_then(|n| n.rsplit('_').next())
            .and_then(trailing_number);

        if let Some(k_point) = parent_k {
            return Ok(SampleKey {
                group: GroupKey::polymorph(parts[0], parts[1]),
                k_point,
            });
        }
    }

    Err(FreerankError::UnrecognizedFileName(
        path.display().to_string(),
    ))
}

/// 从计时文件相对 `root` 的目录布局推导分组键
///
/// 第一级目录为晶体，第二级为多晶型，文件所在目录名中的最后一个数值为 k 值。
pub fn timing_key_from_path(root: &Path, path: &Path) -> Result<SampleKey> {
    let unrecognized = || FreerankError::UnrecognizedFileName(path.display().to_string());

    let dirs: Vec<&str> = path
        .parent()
        .and_then(|p| p.strip_prefix(root).ok())
        .ok_or_else(unrecognized)?
        .iter()
        .filter_map(|c| c.to_str())
        .collect();

    if dirs.len() < 3 {
        return Err(unrecognized());
    }

    let k_point = dirs
        .last()
        .and_then(|d| trailing_number(d))
        .ok_or_else(unrecognized)?;

    Ok(SampleKey {
        group: GroupKey::polymorph(dirs[0], dirs[1]),
        k_point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_plain_k_value() {
        let key = sample_key_from_path(Path::new("energy-files/cumjoj_form1_0.12.out")).unwrap();
        assert_eq!(key.group, GroupKey::polymorph("cumjoj", "form1"));
        assert!((key.k_point - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_prefixed_k_value_with_suffix() {
        let key =
            sample_key_from_path(Path::new("izijoq_QR-2_k-value-0.25_energies.out")).unwrap();
        assert_eq!(key.group.crystal, "izijoq");
        assert_eq!(key.group.polymorph.as_deref(), Some("QR-2"));
        assert!((key.k_point - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_k_value_from_parent_directory() {
        let path: PathBuf = ["crystal-files", "k_value_0.08", "bevcek_form2.out"].iter().collect();
        let key = sample_key_from_path(&path).unwrap();
        assert_eq!(key.group, GroupKey::polymorph("bevcek", "form2"));
        assert!((key.k_point - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_timing_key_from_directory_layout() {
        let root = Path::new("crystal-files");
        let path: PathBuf = [
            "crystal-files",
            "bevcek",
            "form2",
            "dmacrys",
            "k_value_0.25",
            "bevcek-3.res_ld1.dmaout",
        ]
        .iter()
        .collect();
        let key = timing_key_from_path(root, &path).unwrap();
        assert_eq!(key.group, GroupKey::polymorph("bevcek", "form2"));
        assert!((key.k_point - 0.25).abs() < 1e-12);

        let shallow: PathBuf = ["crystal-files", "bevcek", "run.dmaout"].iter().collect();
        assert!(timing_key_from_path(root, &shallow).is_err());
    }

    #[test]
    fn test_unrecognized_name() {
        assert!(sample_key_from_path(Path::new("run/summary.out")).is_err());
    }
}
