// In-memory aggregation store.
//
// Owns every PlateAppearance, SeasonTotals, and Game record for the
// process lifetime. Storage is volatile and resets on restart; there is
// no undo, and re-ingesting the same file double-counts (documented
// additive merge contract). One coarse mutex covers the whole store;
// merge and query calls are short and never block on I/O while holding
// the lock.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{Game, PlateAppearance, SeasonTotals, UploadMeta};
use crate::stats::DerivedStats;

// ---------------------------------------------------------------------------
// Query filter
// ---------------------------------------------------------------------------

/// Leaderboard filter. Unset fields pass everything; a filter value that
/// matches nothing yields an empty result, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardFilter {
    pub league: Option<String>,
    pub season: Option<String>,
    pub team: Option<String>,
}

// ---------------------------------------------------------------------------
// Store internals
// ---------------------------------------------------------------------------

/// Totals are keyed by (player, team, league, season).
type TotalsKey = (String, String, String, String);

#[derive(Debug)]
struct TotalsEntry {
    totals: SeasonTotals,
    /// Game ids already counted toward games_played for this key. A second
    /// row for the same player in the same game sums into the totals but
    /// does not count as another game.
    seen_games: HashSet<u64>,
}

#[derive(Debug, Default)]
struct StoreInner {
    next_game_id: u64,
    games: Vec<Game>,
    rows: Vec<PlateAppearance>,
    totals: HashMap<TotalsKey, TotalsEntry>,
}

/// Thread-safe in-memory store for games, plate appearances, and season
/// totals. Shared across concurrent callers behind an `Arc`.
#[derive(Debug, Default)]
pub struct StatStore {
    inner: Mutex<StoreInner>,
}

impl StatStore {
    pub fn new() -> Self {
        StatStore::default()
    }

    /// Acquire the store lock.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn inner(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("store mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Games
    // ------------------------------------------------------------------

    /// Record a new game and return it with its assigned id.
    pub fn create_game(
        &self,
        meta: &UploadMeta,
        home_team: &str,
        away_team: &str,
        home_score: i64,
        away_score: i64,
    ) -> Game {
        let winner = if home_score > away_score {
            Some(home_team.to_string())
        } else if away_score > home_score {
            Some(away_team.to_string())
        } else {
            None
        };

        let mut inner = self.inner();
        inner.next_game_id += 1;
        let game = Game {
            id: inner.next_game_id,
            league: meta.league.clone(),
            season: meta.season.clone(),
            date: meta.date,
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            home_score,
            away_score,
            winner,
            created_at: Utc::now(),
        };
        inner.games.push(game.clone());
        info!(
            game_id = game.id,
            home = %game.home_team,
            away = %game.away_team,
            total_games = inner.games.len(),
            "game recorded"
        );
        game
    }

    pub fn game(&self, id: u64) -> Option<Game> {
        self.inner().games.iter().find(|g| g.id == id).cloned()
    }

    /// List games, newest first (date descending, then created_at
    /// descending). Unset filters pass everything.
    pub fn games(&self, league: Option<&str>, season: Option<&str>) -> Vec<Game> {
        let inner = self.inner();
        let mut games: Vec<Game> = inner
            .games
            .iter()
            .filter(|g| league.is_none_or(|l| g.league == l))
            .filter(|g| season.is_none_or(|s| g.season == s))
            .cloned()
            .collect();
        games.sort_by(|a, b| (b.date, b.created_at).cmp(&(a.date, a.created_at)));
        games
    }

    /// Look for an already-recorded game with the same date, league,
    /// season, and teams (either home/away ordering, case-insensitive).
    ///
    /// Advisory only: ingestion remains additive and never refuses a
    /// duplicate, but callers can warn before double-counting.
    pub fn find_duplicate_game(
        &self,
        date: NaiveDate,
        league: &str,
        season: &str,
        home_team: &str,
        away_team: &str,
    ) -> Option<Game> {
        let home = norm(home_team);
        let away = norm(away_team);
        self.inner()
            .games
            .iter()
            .find(|g| {
                if g.date != date || g.league != league || g.season != season {
                    return false;
                }
                let g_home = norm(&g.home_team);
                let g_away = norm(&g.away_team);
                (g_home == home && g_away == away) || (g_home == away && g_away == home)
            })
            .cloned()
    }

    // ------------------------------------------------------------------
    // Merge
    // ------------------------------------------------------------------

    /// Merge one plate appearance into the season totals for its
    /// (player, team, league, season) key. Counting stats are added,
    /// games_played increments once per distinct (player, game) pair, and
    /// derived stats are recomputed from the new sums. Totals only ever
    /// grow; there is no undo.
    pub fn merge_row(&self, pa: PlateAppearance) {
        let key: TotalsKey = (
            pa.player_name.clone(),
            pa.team.clone(),
            pa.league.clone(),
            pa.season.clone(),
        );

        let mut inner = self.inner();
        let entry = inner.totals.entry(key).or_insert_with(|| TotalsEntry {
            totals: SeasonTotals {
                player_name: pa.player_name.clone(),
                team: pa.team.clone(),
                league: pa.league.clone(),
                season: pa.season.clone(),
                games_played: 0,
                line: Default::default(),
                derived: Default::default(),
            },
            seen_games: HashSet::new(),
        });

        if entry.seen_games.insert(pa.game_id) {
            entry.totals.games_played += 1;
        }
        entry.totals.line.add(&pa.line);
        entry.totals.derived = DerivedStats::from_line(&entry.totals.line);

        debug!(
            player = %pa.player_name,
            team = %pa.team,
            game_id = pa.game_id,
            "merged plate appearance"
        );
        inner.rows.push(pa);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Leaderboard query: totals matching all set filters, ordered by OPS
    /// descending, ties broken by higher AB, then player name ascending.
    /// The ordering is deterministic so repeated calls over unchanged data
    /// return identical snapshots.
    ///
    /// The team filter is trimmed and case-insensitive because team names
    /// are often inferred from file content with inconsistent casing;
    /// league and season come from caller configuration and are matched
    /// exactly.
    pub fn query(&self, filter: &LeaderboardFilter) -> Vec<SeasonTotals> {
        let inner = self.inner();
        let mut results: Vec<SeasonTotals> = inner
            .totals
            .values()
            .map(|e| &e.totals)
            .filter(|t| filter.league.as_deref().is_none_or(|l| t.league == l))
            .filter(|t| filter.season.as_deref().is_none_or(|s| t.season == s))
            .filter(|t| filter.team.as_deref().is_none_or(|tm| norm(&t.team) == norm(tm)))
            .cloned()
            .collect();

        results.sort_by(|a, b| {
            b.derived
                .ops
                .total_cmp(&a.derived.ops)
                .then(b.line.ab.cmp(&a.line.ab))
                .then(a.player_name.cmp(&b.player_name))
        });
        results
    }

    /// All of one player's season totals, across teams, leagues, and
    /// seasons. Name matching is case-insensitive and trimmed.
    pub fn player_totals(&self, player_name: &str) -> Vec<SeasonTotals> {
        let wanted = norm(player_name);
        let inner = self.inner();
        let mut results: Vec<SeasonTotals> = inner
            .totals
            .values()
            .map(|e| &e.totals)
            .filter(|t| norm(&t.player_name) == wanted)
            .cloned()
            .collect();
        results.sort_by(|a, b| {
            (&a.league, &a.season, &a.team).cmp(&(&b.league, &b.season, &b.team))
        });
        results
    }

    /// Sorted unique team names seen in stored rows, optionally scoped to
    /// one league. Teams are not stored as entities; their identity is
    /// derived on demand.
    pub fn teams(&self, league: Option<&str>) -> Vec<String> {
        let inner = self.inner();
        let mut teams: Vec<String> = inner
            .rows
            .iter()
            .filter(|pa| league.is_none_or(|l| pa.league == l))
            .map(|pa| pa.team.trim().to_string())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        teams.sort();
        teams
    }

    /// Number of plate-appearance rows currently stored.
    pub fn row_count(&self) -> usize {
        self.inner().rows.len()
    }

    /// Clear everything and restart id assignment. The only non-additive
    /// operation the store has.
    pub fn reset(&self) {
        let mut inner = self.inner();
        inner.games.clear();
        inner.rows.clear();
        inner.totals.clear();
        inner.next_game_id = 0;
        info!("store reset");
    }
}

fn norm(s: &str) -> String {
    s.trim().to_lowercase()
}
