//! # structures.csv 解析器
//!
//! 读取 CSP 搜索产出的结构表（每行一个候选结构）。
//! 必需列：`id`, `energy`；可选列：`spacegroup`, `density`,
//! `minimization_step`, `trial_number`, `minimization_time`。
//!
//! ## 依赖关系
//! - 被 `commands/rank.rs` 使用
//! - 使用 `models/energy.rs`

use crate::error::{FreerankError, Result};
use crate::models::{EnergyRecord, MinimizationInfo};

use serde::Deserialize;
use std::path::Path;

/// structures 表中的一行
#[derive(Debug, Clone, Deserialize)]
pub struct StructureRow {
    pub id: String,
    pub energy: f64,
    #[serde(default)]
    pub spacegroup: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub density: Option<f64>,
    #[serde(default)]
    pub minimization_step: Option<String>,
    #[serde(default)]
    pub trial_number: Option<String>,
    #[serde(default)]
    pub minimization_time: Option<String>,
}

impl StructureRow {
    /// 转换为尚未附加振动项的能量记录
    pub fn into_record(self) -> EnergyRecord {
        let mut record = EnergyRecord::new(self.id, self.energy);
        record.spacegroup = self.spacegroup.filter(|s| !s.is_empty());
        record.density = self.density;
        record.minimization = MinimizationInfo {
            minimization_step: self.minimization_step,
            trial_number: self.trial_number,
            minimization_time: self.minimization_time,
        };
        record
    }
}

/// 解析后的结构表
#[derive(Debug, Default)]
pub struct StructuresTable {
    pub rows: Vec<StructureRow>,
    /// 无法解析的行：(数据行号, 原因)
    pub skipped: Vec<(usize, String)>,
}

/// 解析 structures.csv 文件
pub fn parse_structures_file(path: &Path) -> Result<StructuresTable> {
    if !path.exists() {
        return Err(FreerankError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let rdr = csv::Reader::from_path(path)?;
    read_structures(rdr, &path.display().to_string())
}

/// 从任意 reader 读取结构表
pub fn read_structures<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
    source: &str,
) -> Result<StructuresTable> {
    let headers = rdr.headers()?.clone();
    for column in ["id", "energy"] {
        if !headers.iter().any(|h| h == column) {
            return Err(FreerankError::MissingColumn {
                column: column.to_string(),
                path: source.to_string(),
            });
        }
    }

    let mut table = StructuresTable::default();
    for (idx, row) in rdr.deserialize::<StructureRow>().enumerate() {
        match row {
            Ok(row) => table.rows.push(row),
            Err(e) => table.skipped.push((idx + 1, e.to_string())),
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(text: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(text.as_bytes())
    }

    #[test]
    fn test_read_full_table() {
        let text = "\
id,spacegroup,density,energy,minimization_step,trial_number,minimization_time
izijoq-QR-2-1566-3,P21/c,1.423,-102.5,2,1566,12.1
izijoq-QR-14-22-1,P-1,1.401,-101.9,1,22,9.8
";
        let table = read_structures(reader(text), "structures.csv").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert!(table.skipped.is_empty());

        let record = table.rows[0].clone().into_record();
        assert_eq!(record.id, "izijoq-QR-2-1566-3");
        assert_eq!(record.lattice_energy, -102.5);
        assert_eq!(record.density, Some(1.423));
        assert_eq!(record.spacegroup.as_deref(), Some("P21/c"));
        assert_eq!(record.minimization.trial_number.as_deref(), Some("1566"));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let table = read_structures(reader("id,energy\nA,-500.0\nB,-510.0\n"), "s.csv").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].density, None);
    }

    #[test]
    fn test_missing_energy_column_is_reported() {
        let err = read_structures(reader("id,density\nA,1.2\n"), "s.csv").unwrap_err();
        assert!(matches!(err, FreerankError::MissingColumn { ref column, .. } if column == "energy"));
    }

    #[test]
    fn test_bad_row_is_skipped() {
        let table = read_structures(reader("id,energy,density\nA,oops,1.0\nB,-3.0,N/A\n"), "s.csv")
            .unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].id, "B");
        assert_eq!(table.rows[0].density, None);
        assert_eq!(table.skipped.len(), 1);
        assert_eq!(table.skipped[0].0, 1);
    }
}
