// Derived-stat formulas.
//
// Pure functions over counting stats, applied identically to a single game
// row and to aggregated season sums. Every zero-denominator case yields
// 0.0 rather than an error or NaN so leaderboard sorting never breaks on
// zero-AB entries.

use serde::{Deserialize, Serialize};

use crate::model::BattingLine;

/// Stats recomputed from summed counting stats after every merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub singles: i64,
    pub pa: i64,
    pub tb: i64,
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub ops: f64,
}

impl DerivedStats {
    /// Compute the full derived line for a batting line.
    pub fn from_line(line: &BattingLine) -> Self {
        let singles = singles(line);
        let tb = singles + 2 * line.doubles + 3 * line.triples + 4 * line.hr;
        let obp = obp(line);
        let slg = ratio(tb, line.ab);
        DerivedStats {
            singles,
            pa: plate_appearances(line),
            tb,
            avg: ratio(line.h, line.ab),
            obp,
            slg,
            ops: obp + slg,
        }
    }
}

/// Singles = H - 2B - 3B - HR, floored at 0. Source data can violate
/// H >= 2B+3B+HR, and a negative singles count must not leak into TB.
pub fn singles(line: &BattingLine) -> i64 {
    (line.h - line.doubles - line.triples - line.hr).max(0)
}

/// PA = AB + BB + HBP + SF + SH.
pub fn plate_appearances(line: &BattingLine) -> i64 {
    line.ab + line.bb + line.hbp + line.sf + line.sh
}

/// OBP = (H + BB + HBP) / (AB + BB + HBP + SF), 0.0 when the denominator
/// is zero.
pub fn obp(line: &BattingLine) -> f64 {
    ratio(
        line.h + line.bb + line.hbp,
        line.ab + line.bb + line.hbp + line.sf,
    )
}

fn ratio(num: i64, denom: i64) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}
