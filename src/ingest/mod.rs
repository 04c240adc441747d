// CSV ingestion pipeline: section splitting, column normalization, row
// validation, and merge into the aggregation store.

pub mod columns;
pub mod rows;
pub mod sections;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::ingest::columns::{ColumnMap, Field};
use crate::ingest::rows::{parse_row, ParsedRow};
use crate::ingest::sections::{split_sections, Section, TeamName};
use crate::model::{PlateAppearance, UploadMeta};
use crate::store::StatStore;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Required columns that failed to resolve for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFailure {
    /// 1-based section number in file order.
    pub section: usize,
    pub missing: Vec<Field>,
}

impl std::fmt::Display for SectionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let missing: Vec<&str> = self.missing.iter().map(|m| m.as_str()).collect();
        write!(f, "section {} missing [{}]", self.section, missing.join(", "))
    }
}

/// Fatal ingestion failures. Per-row problems are not errors; they are
/// accumulated into the summary instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("no team sections with data found in file")]
    NoSections,

    #[error("required columns could not be resolved in any section: {}", fmt_failures(.0))]
    MissingRequiredColumns(Vec<SectionFailure>),
}

fn fmt_failures(failures: &[SectionFailure]) -> String {
    failures
        .iter()
        .map(SectionFailure::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// One skipped row, keyed by its 1-based line number in the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub row: usize,
    pub reason: String,
}

/// Result of one successful (possibly partial) ingestion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    pub game_id: u64,
    pub home_team: TeamName,
    pub away_team: TeamName,
    pub home_score: i64,
    pub away_score: i64,
    pub rows_ingested: usize,
    pub rows_skipped: usize,
    pub errors: Vec<RowIssue>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Ingest one uploaded game file: split into team sections, normalize each
/// section's columns, validate rows, compute per-row derived stats, merge
/// everything into the store, and record one Game.
///
/// Fails wholesale (no Game, nothing merged) only when the file is empty,
/// has no data sections, or no section's required columns resolve. A
/// section failure with a healthy sibling section, and any per-row
/// validation failure, degrade to summary entries instead.
pub fn ingest(
    store: &StatStore,
    bytes: &[u8],
    meta: &UploadMeta,
) -> Result<IngestSummary, IngestError> {
    let text = decode(bytes);
    if text.trim().is_empty() {
        return Err(IngestError::EmptyFile);
    }

    let mut all_sections = split_sections(&text);
    if all_sections.is_empty() {
        return Err(IngestError::NoSections);
    }

    let mut warnings = Vec::new();
    if all_sections.len() > 2 {
        warnings.push(format!(
            "file contains {} team sections; only the first two were ingested",
            all_sections.len()
        ));
        warn!(sections = all_sections.len(), "extra team sections ignored");
        all_sections.truncate(2);
    }

    // Resolve columns for every kept section up front; the game record is
    // only created once we know at least one section is ingestable.
    let maps: Vec<ColumnMap> = all_sections
        .iter()
        .map(|s| ColumnMap::resolve(&s.header))
        .collect();
    let failures: Vec<SectionFailure> = maps
        .iter()
        .enumerate()
        .filter_map(|(i, map)| {
            let missing = map.missing_required();
            (!missing.is_empty()).then(|| SectionFailure {
                section: i + 1,
                missing,
            })
        })
        .collect();
    if failures.len() == all_sections.len() {
        return Err(IngestError::MissingRequiredColumns(failures));
    }
    for failure in &failures {
        warnings.push(format!("{failure}; section skipped"));
        warn!(%failure, "team section skipped");
    }

    let team_names = resolve_team_names(&all_sections, &maps, meta);
    if all_sections.len() == 1 {
        warnings.push("file contains a single team section; ingested as a partial upload".into());
    }

    // Parse all rows before touching the store.
    let mut parsed: Vec<(usize, ParsedRow)> = Vec::new();
    let mut errors: Vec<RowIssue> = Vec::new();
    let mut section_runs = [0i64; 2];
    let failed: Vec<usize> = failures.iter().map(|f| f.section - 1).collect();
    for (idx, section) in all_sections.iter().enumerate() {
        if failed.contains(&idx) {
            continue;
        }
        for data_row in &section.rows {
            match parse_row(&maps[idx], data_row) {
                Ok(row) => {
                    section_runs[idx] += row.line.r;
                    parsed.push((idx, row));
                }
                Err(e) => errors.push(RowIssue {
                    row: data_row.line,
                    reason: e.to_string(),
                }),
            }
        }
    }
    if parsed.is_empty() && errors.is_empty() {
        return Err(IngestError::NoSections);
    }

    let home = &team_names[0];
    let away = &team_names[1];
    let game = store.create_game(meta, &home.name, &away.name, section_runs[0], section_runs[1]);

    let rows_ingested = parsed.len();
    for (idx, row) in parsed {
        store.merge_row(PlateAppearance {
            game_id: game.id,
            player_name: row.player_name,
            team: team_names[idx].name.clone(),
            league: meta.league.clone(),
            season: meta.season.clone(),
            game_date: meta.date,
            line: row.line,
        });
    }

    info!(
        game_id = game.id,
        home = %home.name,
        away = %away.name,
        rows_ingested,
        rows_skipped = errors.len(),
        "file ingested"
    );

    Ok(IngestSummary {
        game_id: game.id,
        home_team: home.clone(),
        away_team: away.clone(),
        home_score: game.home_score,
        away_score: game.away_score,
        rows_ingested,
        rows_skipped: errors.len(),
        errors,
        warnings,
    })
}

/// Decode uploaded bytes: UTF-8 first, Latin-1 fallback (every byte maps
/// to a character, so this never fails).
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Resolve the two team names positionally: explicit metadata wins, then
/// the section's marker label, then a team-column cell, then a
/// positional placeholder. Inferred and placeholder names are provisional
/// and flagged as such in the summary.
fn resolve_team_names(
    sections: &[Section],
    maps: &[ColumnMap],
    meta: &UploadMeta,
) -> [TeamName; 2] {
    let explicit = [meta.home_team.as_deref(), meta.away_team.as_deref()];
    std::array::from_fn(|i| {
        if let Some(name) = explicit[i].filter(|n| !n.trim().is_empty()) {
            return TeamName::explicit(name);
        }
        let Some(section) = sections.get(i) else {
            return TeamName::placeholder(i);
        };
        if let Some(label) = &section.label {
            return TeamName::inferred(label);
        }
        if let Some(col) = maps.get(i).and_then(|m| m.get(Field::Team)) {
            let from_column = section
                .rows
                .iter()
                .filter_map(|r| r.cells.get(col))
                .find(|c| !c.trim().is_empty());
            if let Some(name) = from_column {
                return TeamName::inferred(name);
            }
        }
        TeamName::placeholder(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::sections::TeamNameSource;
    use crate::store::LeaderboardFilter;
    use chrono::NaiveDate;

    const DUAL_ROSTER: &str = "\
Tigers,Batting Order
Player,AB,R,H,2B,3B,HR,RBI,SO,BB
J. Smith,4,2,2,0,0,1,3,1,1
M. Okafor,3,1,1,1,0,0,1,0,0

Hawks,Batting Order
Player,AB,R,H,2B,3B,HR,RBI,SO,BB
A. Lee,3,0,1,0,0,0,0,2,0
B. Cho,3,1,1,1,0,0,1,0,1";

    fn meta() -> UploadMeta {
        UploadMeta {
            league: "Metro League".to_string(),
            season: "2025".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            home_team: None,
            away_team: None,
        }
    }

    // ------------------------------------------------------------------
    // Happy path
    // ------------------------------------------------------------------

    #[test]
    fn ingests_dual_roster_file() {
        let store = StatStore::new();
        let summary = ingest(&store, DUAL_ROSTER.as_bytes(), &meta()).unwrap();

        assert_eq!(summary.rows_ingested, 4);
        assert_eq!(summary.rows_skipped, 0);
        assert!(summary.errors.is_empty());
        assert!(summary.warnings.is_empty());
        assert_eq!(summary.home_team.name, "Tigers");
        assert_eq!(summary.home_team.source, TeamNameSource::Inferred);
        assert_eq!(summary.away_team.name, "Hawks");
        // Scores derive from the runs column: 2+1 vs 0+1.
        assert_eq!(summary.home_score, 3);
        assert_eq!(summary.away_score, 1);

        let game = store.game(summary.game_id).unwrap();
        assert_eq!(game.winner.as_deref(), Some("Tigers"));
    }

    #[test]
    fn explicit_metadata_team_names_win_positionally() {
        let store = StatStore::new();
        let mut m = meta();
        m.home_team = Some("Real Tigers".to_string());
        m.away_team = Some("Real Hawks".to_string());
        let summary = ingest(&store, DUAL_ROSTER.as_bytes(), &m).unwrap();

        assert_eq!(summary.home_team.name, "Real Tigers");
        assert_eq!(summary.home_team.source, TeamNameSource::Explicit);
        assert_eq!(summary.away_team.name, "Real Hawks");

        let teams = store.teams(None);
        assert_eq!(teams, vec!["Real Hawks", "Real Tigers"]);
    }

    #[test]
    fn merged_totals_match_known_round_trip() {
        let store = StatStore::new();
        ingest(&store, DUAL_ROSTER.as_bytes(), &meta()).unwrap();

        let smith = &store.player_totals("J. Smith")[0];
        assert_eq!(smith.line.ab, 4);
        assert_eq!(smith.line.h, 2);
        assert!((smith.derived.avg - 0.5).abs() < f64::EPSILON);

        let board = store.query(&LeaderboardFilter::default());
        assert_eq!(board[0].player_name, "J. Smith");
    }

    // ------------------------------------------------------------------
    // Fatal errors
    // ------------------------------------------------------------------

    #[test]
    fn empty_file_is_fatal() {
        let store = StatStore::new();
        assert!(matches!(
            ingest(&store, b"", &meta()),
            Err(IngestError::EmptyFile)
        ));
        assert!(matches!(
            ingest(&store, b"  \n \n", &meta()),
            Err(IngestError::EmptyFile)
        ));
        assert!(store.games(None, None).is_empty());
    }

    #[test]
    fn both_sections_unresolvable_is_fatal_and_creates_nothing() {
        let text = "\
Tigers,Batting Order
Player,R,RBI
J. Smith,2,3
Hawks,Batting Order
Player,R,RBI
A. Lee,0,0";
        let store = StatStore::new();
        let err = ingest(&store, text.as_bytes(), &meta()).unwrap_err();

        match err {
            IngestError::MissingRequiredColumns(failures) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].section, 1);
                assert_eq!(failures[0].missing, vec![Field::Ab, Field::H, Field::Hr]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.games(None, None).is_empty());
        assert_eq!(store.row_count(), 0);
    }

    // ------------------------------------------------------------------
    // Partial failures
    // ------------------------------------------------------------------

    #[test]
    fn one_bad_section_is_skipped_with_warning() {
        // First section lacks AB; second is fine.
        let text = "\
Tigers,Batting Order
Player,R,H,HR
J. Smith,2,2,1
Hawks,Batting Order
Player,AB,R,H,HR
A. Lee,3,1,1,0";
        let store = StatStore::new();
        let summary = ingest(&store, text.as_bytes(), &meta()).unwrap();

        assert_eq!(summary.rows_ingested, 1);
        assert!(summary.warnings.iter().any(|w| w.contains("section 1")));
        // The skipped section still contributes the game's home team name.
        assert_eq!(summary.home_team.name, "Tigers");
        assert_eq!(summary.home_score, 0);
        assert_eq!(summary.away_score, 1);
        assert_eq!(store.teams(None), vec!["Hawks"]);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported_by_line() {
        let text = "\
Tigers,Batting Order
Player,AB,R,H,HR
J. Smith,4,2,2,1
,3,1,1,0
A. Ruiz,x,0,1,0
M. Okafor,3,0,1,0";
        let store = StatStore::new();
        let summary = ingest(&store, text.as_bytes(), &meta()).unwrap();

        assert_eq!(summary.rows_ingested, 2);
        assert_eq!(summary.rows_skipped, 2);
        assert_eq!(summary.errors.len(), 2);
        assert_eq!(summary.errors[0].row, 4);
        assert!(summary.errors[0].reason.contains("player name"));
        assert_eq!(summary.errors[1].row, 5);
        assert!(summary.errors[1].reason.contains("AB"));
    }

    #[test]
    fn extra_sections_are_ignored_with_warning() {
        let text = format!(
            "{DUAL_ROSTER}\n\nOtters,Batting Order\nPlayer,AB,R,H,HR\nC. Diaz,4,1,2,0"
        );
        let store = StatStore::new();
        let summary = ingest(&store, text.as_bytes(), &meta()).unwrap();

        assert_eq!(summary.rows_ingested, 4);
        assert!(summary.warnings.iter().any(|w| w.contains("3 team sections")));
        assert!(store.player_totals("C. Diaz").is_empty());
    }

    // ------------------------------------------------------------------
    // Degraded modes
    // ------------------------------------------------------------------

    #[test]
    fn single_section_file_ingests_as_partial_upload() {
        let text = "\
Tigers,Batting Order
Player,AB,R,H,HR
J. Smith,4,2,2,1";
        let store = StatStore::new();
        let summary = ingest(&store, text.as_bytes(), &meta()).unwrap();

        assert_eq!(summary.rows_ingested, 1);
        assert_eq!(summary.home_team.name, "Tigers");
        assert_eq!(summary.away_team.name, "Team B");
        assert_eq!(summary.away_team.source, TeamNameSource::Placeholder);
        assert!(summary.warnings.iter().any(|w| w.contains("single team section")));
    }

    #[test]
    fn markerless_file_infers_team_from_team_column() {
        let text = "\
Player,Team,AB,R,H,HR
J. Smith,Tigers,4,2,2,1
A. Lee,Tigers,3,0,1,0";
        let store = StatStore::new();
        let summary = ingest(&store, text.as_bytes(), &meta()).unwrap();

        assert_eq!(summary.rows_ingested, 2);
        assert_eq!(summary.home_team.name, "Tigers");
        assert_eq!(summary.home_team.source, TeamNameSource::Inferred);
    }

    #[test]
    fn markerless_file_without_team_column_gets_placeholder() {
        let text = "Player,AB,H,HR\nJ. Smith,4,2,1";
        let store = StatStore::new();
        let summary = ingest(&store, text.as_bytes(), &meta()).unwrap();

        assert_eq!(summary.home_team.name, "Team A");
        assert_eq!(summary.home_team.source, TeamNameSource::Placeholder);
    }

    // ------------------------------------------------------------------
    // Re-ingestion (documented additive behavior)
    // ------------------------------------------------------------------

    #[test]
    fn reingesting_same_file_double_counts() {
        let store = StatStore::new();
        ingest(&store, DUAL_ROSTER.as_bytes(), &meta()).unwrap();
        ingest(&store, DUAL_ROSTER.as_bytes(), &meta()).unwrap();

        let smith = &store.player_totals("J. Smith")[0];
        assert_eq!(smith.line.ab, 8);
        assert_eq!(smith.line.h, 4);
        assert_eq!(smith.games_played, 2);
        assert_eq!(store.games(None, None).len(), 2);
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    #[test]
    fn latin1_bytes_are_decoded() {
        // 0xE9 = 'é' in Latin-1, invalid as a lone UTF-8 byte.
        let text = b"Tigres,Batting Order\nPlayer,AB,R,H,HR\nJ. P\xe9rez,4,1,2,0";
        let store = StatStore::new();
        let summary = ingest(&store, text, &meta()).unwrap();

        assert_eq!(summary.rows_ingested, 1);
        assert_eq!(store.player_totals("J. Pérez").len(), 1);
    }
}
