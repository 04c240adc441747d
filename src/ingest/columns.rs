// Column normalization: maps arbitrary header spellings to canonical
// stat fields.
//
// The synonym table is a frozen contract; external tooling generating
// uploads relies on exactly these spellings being recognized.

use std::fmt;

// ---------------------------------------------------------------------------
// Canonical fields
// ---------------------------------------------------------------------------

/// Canonical field names a header column can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Player,
    Team,
    Ab,
    H,
    Doubles,
    Triples,
    Hr,
    Bb,
    Hbp,
    Sf,
    Sh,
    K,
    R,
    Rbi,
    Sb,
    Cs,
}

impl Field {
    pub const COUNT: usize = 16;

    /// Header columns that must resolve for a section to be ingestable.
    /// The team requirement is satisfied by the section's team label, so
    /// a team column is never required in the header itself.
    pub const REQUIRED: [Field; 4] = [Field::Player, Field::Ab, Field::H, Field::Hr];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Player => "player",
            Field::Team => "team",
            Field::Ab => "AB",
            Field::H => "H",
            Field::Doubles => "2B",
            Field::Triples => "3B",
            Field::Hr => "HR",
            Field::Bb => "BB",
            Field::Hbp => "HBP",
            Field::Sf => "SF",
            Field::Sh => "SH",
            Field::K => "K",
            Field::R => "R",
            Field::Rbi => "RBI",
            Field::Sb => "SB",
            Field::Cs => "CS",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve one raw header cell to a canonical field. Matching is
/// case-insensitive and whitespace-tolerant; unrecognized headers yield
/// `None` and are ignored by the caller.
pub fn canonical(raw: &str) -> Option<Field> {
    match raw.trim().to_lowercase().as_str() {
        "player" | "name" | "player name" | "player_name" | "batter" | "hitter" => {
            Some(Field::Player)
        }
        "team" | "team name" | "team_name" => Some(Field::Team),
        "ab" | "at bats" | "at-bats" | "at_bats" => Some(Field::Ab),
        "h" | "hits" | "hit" => Some(Field::H),
        "2b" | "double" | "doubles" | "2 b" => Some(Field::Doubles),
        "3b" | "triple" | "triples" | "3 b" => Some(Field::Triples),
        "hr" | "home runs" | "homeruns" | "home_run" | "homer" => Some(Field::Hr),
        "bb" | "walks" | "walk" | "base on balls" => Some(Field::Bb),
        "hbp" | "hit by pitch" | "hit_by_pitch" => Some(Field::Hbp),
        "sf" | "sacrifice fly" | "sac_fly" => Some(Field::Sf),
        "sh" | "sacrifice hit" | "sacrifice bunt" | "sac_bunt" => Some(Field::Sh),
        "so" | "k" | "strikeouts" | "strikeout" | "strike outs" => Some(Field::K),
        "r" | "runs" | "run" => Some(Field::R),
        "rbi" | "runs batted in" | "runs_batted_in" => Some(Field::Rbi),
        "sb" | "stolen bases" | "stolen_base" => Some(Field::Sb),
        "cs" | "caught stealing" | "caught_stealing" => Some(Field::Cs),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Column map
// ---------------------------------------------------------------------------

/// Mapping from canonical field to column index for one section's header
/// row. When the same field appears twice, the first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [Option<usize>; Field::COUNT],
}

impl ColumnMap {
    /// Build the map from a header row. Unmatched headers are ignored;
    /// required-column enforcement is the caller's job via
    /// [`ColumnMap::missing_required`].
    pub fn resolve(header: &[String]) -> ColumnMap {
        let mut indices = [None; Field::COUNT];
        for (idx, cell) in header.iter().enumerate() {
            if let Some(field) = canonical(cell) {
                let slot = &mut indices[field.slot()];
                if slot.is_none() {
                    *slot = Some(idx);
                }
            }
        }
        ColumnMap { indices }
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.indices[field.slot()]
    }

    /// Required fields that did not resolve, in declaration order.
    pub fn missing_required(&self) -> Vec<Field> {
        Field::REQUIRED
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    // -- Synonym resolution --

    #[test]
    fn canonical_handles_common_synonyms() {
        assert_eq!(canonical("Name"), Some(Field::Player));
        assert_eq!(canonical("Batter"), Some(Field::Player));
        assert_eq!(canonical("2B"), Some(Field::Doubles));
        assert_eq!(canonical("Triples"), Some(Field::Triples));
        assert_eq!(canonical("SO"), Some(Field::K));
        assert_eq!(canonical("Base on Balls"), Some(Field::Bb));
        assert_eq!(canonical("Caught Stealing"), Some(Field::Cs));
    }

    #[test]
    fn canonical_is_case_insensitive_and_trims() {
        assert_eq!(canonical("  PLAYER NAME "), Some(Field::Player));
        assert_eq!(canonical("hr"), Some(Field::Hr));
        assert_eq!(canonical(" At Bats"), Some(Field::Ab));
    }

    #[test]
    fn canonical_ignores_unknown_headers() {
        assert_eq!(canonical("EBH"), None);
        assert_eq!(canonical("#P"), None);
        assert_eq!(canonical(""), None);
    }

    // -- Map resolution --

    #[test]
    fn resolve_maps_fields_to_indices() {
        let map = ColumnMap::resolve(&header(&["Player", "AB", "R", "H", "2B", "3B", "HR"]));
        assert_eq!(map.get(Field::Player), Some(0));
        assert_eq!(map.get(Field::Ab), Some(1));
        assert_eq!(map.get(Field::R), Some(2));
        assert_eq!(map.get(Field::H), Some(3));
        assert_eq!(map.get(Field::Doubles), Some(4));
        assert_eq!(map.get(Field::Triples), Some(5));
        assert_eq!(map.get(Field::Hr), Some(6));
        assert_eq!(map.get(Field::Bb), None);
        assert!(map.missing_required().is_empty());
    }

    #[test]
    fn resolve_keeps_first_occurrence_on_duplicates() {
        let map = ColumnMap::resolve(&header(&["Name", "Player", "AB", "H", "HR"]));
        assert_eq!(map.get(Field::Player), Some(0));
    }

    #[test]
    fn missing_required_reports_unresolved_fields() {
        // No AB or HR column.
        let map = ColumnMap::resolve(&header(&["Player", "H", "BB", "RBI"]));
        assert_eq!(map.missing_required(), vec![Field::Ab, Field::Hr]);
    }

    #[test]
    fn unmatched_extra_columns_are_not_an_error() {
        let map = ColumnMap::resolve(&header(&["Player", "AB", "H", "HR", "EBH", "#P", "DP"]));
        assert!(map.missing_required().is_empty());
    }
}
