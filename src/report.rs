// Leaderboard export: CSV and JSON writers plus a printable table.
//
// Writers are generic over `io::Write` so tests run against in-memory
// buffers instead of temp files.

use std::io::Write;

use anyhow::{Context, Result};

use crate::model::SeasonTotals;

/// Write season totals as a CSV file, one row per (player, team, league,
/// season) key, in the order given (callers pass leaderboard order).
pub fn write_totals_csv<W: Write>(writer: W, totals: &[SeasonTotals]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record([
            "Player", "Team", "League", "Season", "G", "PA", "AB", "R", "H", "2B", "3B", "HR",
            "RBI", "BB", "HBP", "SF", "SH", "SO", "SB", "CS", "TB", "AVG", "OBP", "SLG", "OPS",
        ])
        .context("failed to write CSV header")?;

    for t in totals {
        csv_writer
            .write_record([
                t.player_name.clone(),
                t.team.clone(),
                t.league.clone(),
                t.season.clone(),
                t.games_played.to_string(),
                t.derived.pa.to_string(),
                t.line.ab.to_string(),
                t.line.r.to_string(),
                t.line.h.to_string(),
                t.line.doubles.to_string(),
                t.line.triples.to_string(),
                t.line.hr.to_string(),
                t.line.rbi.to_string(),
                t.line.bb.to_string(),
                t.line.hbp.to_string(),
                t.line.sf.to_string(),
                t.line.sh.to_string(),
                t.line.k.to_string(),
                t.line.sb.to_string(),
                t.line.cs.to_string(),
                t.derived.tb.to_string(),
                rate(t.derived.avg),
                rate(t.derived.obp),
                rate(t.derived.slg),
                rate(t.derived.ops),
            ])
            .context("failed to write CSV row")?;
    }
    csv_writer.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Write season totals as pretty-printed JSON (full precision, no display
/// rounding; consumers format rates themselves).
pub fn write_leaderboard_json<W: Write>(writer: W, totals: &[SeasonTotals]) -> Result<()> {
    serde_json::to_writer_pretty(writer, totals).context("failed to write leaderboard JSON")
}

/// Render a fixed-width leaderboard table for terminal output.
pub fn format_leaderboard(totals: &[SeasonTotals]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<4} {:<22} {:<16} {:>3} {:>4} {:>4} {:>3} {:>3} {:>6} {:>6} {:>6} {:>6}\n",
        "#", "Player", "Team", "G", "PA", "AB", "H", "HR", "AVG", "OBP", "SLG", "OPS"
    ));
    for (rank, t) in totals.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<22} {:<16} {:>3} {:>4} {:>4} {:>3} {:>3} {:>6} {:>6} {:>6} {:>6}\n",
            rank + 1,
            t.player_name,
            t.team,
            t.games_played,
            t.derived.pa,
            t.line.ab,
            t.line.h,
            t.line.hr,
            rate(t.derived.avg),
            rate(t.derived.obp),
            rate(t.derived.slg),
            rate(t.derived.ops),
        ));
    }
    out
}

/// Display rounding only; the store keeps rates at full precision.
fn rate(value: f64) -> String {
    format!("{value:.3}")
}
