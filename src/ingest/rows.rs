// Per-row parsing and validation.
//
// Converts one raw data row into a typed batting line using the section's
// column map. A required field that fails validation skips that row only;
// optional counting stats silently coerce blank or malformed cells to 0.

use thiserror::Error;

use crate::ingest::columns::{ColumnMap, Field};
use crate::ingest::sections::DataRow;
use crate::model::BattingLine;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("player name is empty")]
    EmptyPlayerName,

    #[error("required stat {field} is missing or not numeric: '{value}'")]
    BadRequiredStat { field: Field, value: String },
}

// ---------------------------------------------------------------------------
// Parsed row
// ---------------------------------------------------------------------------

/// One validated row, not yet bound to a team or game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub player_name: String,
    pub line: BattingLine,
}

/// Parse and validate a single data row against the section's column map.
///
/// Required: a non-empty player name and numeric-coercible AB/H/HR cells.
/// Everything else coerces to 0 when blank or malformed. Negative values
/// pass through unchanged; the export device occasionally emits them as
/// sentinels and the pipeline must not crash on them.
pub fn parse_row(map: &ColumnMap, row: &DataRow) -> Result<ParsedRow, RowError> {
    let player_name = cell(map, row, Field::Player)
        .map(clean)
        .unwrap_or_default();
    if player_name.is_empty() {
        return Err(RowError::EmptyPlayerName);
    }

    let line = BattingLine {
        ab: required(map, row, Field::Ab)?,
        h: required(map, row, Field::H)?,
        hr: required(map, row, Field::Hr)?,
        doubles: optional(map, row, Field::Doubles),
        triples: optional(map, row, Field::Triples),
        bb: optional(map, row, Field::Bb),
        hbp: optional(map, row, Field::Hbp),
        sf: optional(map, row, Field::Sf),
        sh: optional(map, row, Field::Sh),
        k: optional(map, row, Field::K),
        r: optional(map, row, Field::R),
        rbi: optional(map, row, Field::Rbi),
        sb: optional(map, row, Field::Sb),
        cs: optional(map, row, Field::Cs),
    };

    Ok(ParsedRow { player_name, line })
}

fn cell<'a>(map: &ColumnMap, row: &'a DataRow, field: Field) -> Option<&'a str> {
    row.cells.get(map.get(field)?).map(String::as_str)
}

fn required(map: &ColumnMap, row: &DataRow, field: Field) -> Result<i64, RowError> {
    let raw = cell(map, row, field).unwrap_or("");
    coerce_count(raw).ok_or_else(|| RowError::BadRequiredStat {
        field,
        value: raw.to_string(),
    })
}

fn optional(map: &ColumnMap, row: &DataRow, field: Field) -> i64 {
    cell(map, row, field)
        .and_then(coerce_count)
        .unwrap_or_default()
}

fn clean(raw: &str) -> String {
    raw.trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}

/// Coerce a raw cell into a counting stat.
///
/// Accepts integers and integer-like floats (truncated toward zero, so the
/// device's "2.0" style cells parse). Blank, "nan", and non-numeric cells
/// yield `None`; the caller decides whether that means 0 or a validation
/// failure.
pub fn coerce_count(raw: &str) -> Option<i64> {
    let s = clean(raw);
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("none") {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(f as i64),
        _ => None,
    }
}
