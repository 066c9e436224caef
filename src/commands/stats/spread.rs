//! # 能量极差
//!
//! 对每个分组（晶体或晶体_多晶型），各能量项在不同 k 点之间的
//! 最高/最低值及其来源 k 点；并计算各能量项跨分组的平均极差。
//!
//! ## 依赖关系
//! - 使用 `cli/stats.rs` 定义的参数
//! - 使用 `parsers/energy_csv.rs`, `ranking/stats.rs`, `ranking/export.rs`

use super::ensure_output_dir;
use crate::cli::stats::SpreadArgs;
use crate::error::Result;
use crate::models::EnergyVariant;
use crate::parsers::energy_csv::read_energy_csv;
use crate::parsers::EnergySampleRow;
use crate::ranking::export;
use crate::ranking::stats::{energy_spread, EnergySpread};
use crate::utils::output;

use std::collections::BTreeMap;

/// 参与极差统计的能量项
pub const SPREAD_VARIANTS: [EnergyVariant; 3] = [
    EnergyVariant::WithoutCorrection,
    EnergyVariant::WithDebye,
    EnergyVariant::WithDebyeAndKde,
];

pub type GroupSpread = Vec<(EnergyVariant, Option<EnergySpread>)>;

/// 计算每个分组的极差（分组按名称排序）
pub fn group_spreads(rows: &[EnergySampleRow]) -> BTreeMap<String, GroupSpread> {
    let mut groups: BTreeMap<String, Vec<&EnergySampleRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.group().to_string()).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(name, rows)| {
            let spreads = SPREAD_VARIANTS
                .iter()
                .map(|&v| (v, energy_spread(rows.iter().map(|r| (r.k_point, r.energy(v))))))
                .collect();
            (name, spreads)
        })
        .collect()
}

/// 各能量项跨分组的平均极差
pub fn average_spreads<'a, I>(spreads: I) -> Vec<(EnergyVariant, Option<f64>)>
where
    I: IntoIterator<Item = &'a GroupSpread>,
{
    let mut sums: Vec<(f64, usize)> = vec![(0.0, 0); SPREAD_VARIANTS.len()];
    for group in spreads {
        for (i, (_, spread)) in group.iter().enumerate().take(SPREAD_VARIANTS.len()) {
            if let Some(s) = spread {
                sums[i].0 += s.difference();
                sums[i].1 += 1;
            }
        }
    }

    SPREAD_VARIANTS
        .iter()
        .zip(sums)
        .map(|(&v, (sum, n))| (v, (n > 0).then(|| sum / n as f64)))
        .collect()
}

/// 执行 spread
pub fn execute(args: SpreadArgs) -> Result<()> {
    output::print_header("Energy Spread Across K-Points");

    let (rows, skipped) = read_energy_csv(&args.input)?;
    for (line, reason) in &skipped {
        output::print_warning(&format!("Skipped row {}: {}", line, reason));
    }
    ensure_output_dir(&args.output)?;

    let spreads = group_spreads(&rows);
    for (name, spread) in &spreads {
        let path = args.output.join(format!("{}_energy_spread.csv", name));
        export::spread_to_csv(spread, &path)?;
        output::print_written(name, &path.display().to_string());
    }

    let averages = average_spreads(spreads.values());
    let path = args.output.join("average_energy_spread.csv");
    export::average_spread_to_csv(&averages, &path)?;
    output::print_written("Averages", &path.display().to_string());

    output::print_separator();
    for (variant, avg) in &averages {
        match avg {
            Some(a) => println!("  {:<32} {:.6}", variant.to_string(), a),
            None => println!("  {:<32} n/a", variant.to_string()),
        }
    }
    output::print_done(&format!("{} group(s) processed", spreads.len()));

    Ok(())
}
