// Core data types shared across ingestion, stats, and storage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::DerivedStats;

// ---------------------------------------------------------------------------
// Counting stats
// ---------------------------------------------------------------------------

/// One batting line of raw counting stats. Used both for a single game row
/// and for season sums; the stat calculator applies the same formulas at
/// either granularity.
///
/// Values are signed: the exporting device occasionally emits negative
/// sentinel values and the pipeline stores them as-is rather than clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingLine {
    pub ab: i64,
    pub h: i64,
    pub doubles: i64,
    pub triples: i64,
    pub hr: i64,
    pub bb: i64,
    pub hbp: i64,
    pub sf: i64,
    pub sh: i64,
    pub k: i64,
    pub r: i64,
    pub rbi: i64,
    pub sb: i64,
    pub cs: i64,
}

impl BattingLine {
    /// Add another line into this one, stat by stat.
    pub fn add(&mut self, other: &BattingLine) {
        self.ab += other.ab;
        self.h += other.h;
        self.doubles += other.doubles;
        self.triples += other.triples;
        self.hr += other.hr;
        self.bb += other.bb;
        self.hbp += other.hbp;
        self.sf += other.sf;
        self.sh += other.sh;
        self.k += other.k;
        self.r += other.r;
        self.rbi += other.rbi;
        self.sb += other.sb;
        self.cs += other.cs;
    }
}

// ---------------------------------------------------------------------------
// Plate appearance
// ---------------------------------------------------------------------------

/// One player's batting line for one game. Immutable once handed to the
/// store; season totals only ever merge additively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateAppearance {
    pub game_id: u64,
    pub player_name: String,
    pub team: String,
    pub league: String,
    pub season: String,
    pub game_date: NaiveDate,
    pub line: BattingLine,
}

// ---------------------------------------------------------------------------
// Season totals
// ---------------------------------------------------------------------------

/// Aggregated season stats for one (player, team, league, season) key.
/// Counting stats are summed; derived stats are always recomputed from the
/// sums, never summed themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonTotals {
    pub player_name: String,
    pub team: String,
    pub league: String,
    pub season: String,
    pub games_played: u32,
    pub line: BattingLine,
    pub derived: DerivedStats,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// One ingested upload. Scores are derived from the runs column of each
/// team section at ingest time; the record is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub league: String,
    pub season: String,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_score: i64,
    pub away_score: i64,
    /// Winning team name, or `None` for a tie.
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Upload metadata
// ---------------------------------------------------------------------------

/// Caller-supplied metadata accompanying one uploaded file. When the team
/// names are omitted they are inferred from the file's section headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadMeta {
    pub league: String,
    pub season: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
}
