// Team-section splitting for dual-roster exports.
//
// A HitTrax game export places both rosters in one file. Each roster is
// introduced by a marker line containing "Batting Order"; the line after
// the marker is that section's header row and everything up to the next
// marker (or end of file) is that section's data. Files without any
// marker are treated as a single-team partial upload rather than
// rejected.

use serde::Serialize;
use tracing::debug;

/// Marker token identifying a team header line (matched case-insensitively
/// as a substring of the raw line).
pub const SECTION_MARKER: &str = "batting order";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One raw data row with its 1-based line number in the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow {
    pub line: usize,
    pub cells: Vec<String>,
}

/// One team block of the upload: an optional team-label candidate taken
/// from the marker line, the header row, and the data rows that follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Team name candidate from the first cell of the marker line, if the
    /// cell held something other than the marker itself.
    pub label: Option<String>,
    pub header: Vec<String>,
    pub header_line: usize,
    pub rows: Vec<DataRow>,
}

/// Where a section's team name came from. Inferred and placeholder names
/// are provisional; callers wanting certainty should pass explicit
/// home/away metadata instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamNameSource {
    Explicit,
    Inferred,
    Placeholder,
}

/// A resolved team name plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamName {
    pub name: String,
    pub source: TeamNameSource,
}

impl TeamName {
    pub fn explicit(name: &str) -> Self {
        TeamName {
            name: name.trim().to_string(),
            source: TeamNameSource::Explicit,
        }
    }

    pub fn inferred(name: &str) -> Self {
        TeamName {
            name: name.trim().to_string(),
            source: TeamNameSource::Inferred,
        }
    }

    pub fn placeholder(section_index: usize) -> Self {
        let name = if section_index == 0 { "Team A" } else { "Team B" };
        TeamName {
            name: name.to_string(),
            source: TeamNameSource::Placeholder,
        }
    }
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// Split raw file text into ordered team sections.
///
/// Blank lines are skipped. If no marker line exists the whole file is one
/// section whose first non-blank line is the header row.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    // Marker seen, header row not yet: (label, marker line number).
    let mut pending: Option<Option<String>> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }

        if is_marker_line(raw) {
            pending = Some(label_candidate(raw));
            continue;
        }

        let cells = split_cells(raw);
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }

        if let Some(label) = pending.take() {
            debug!(line = line_no, ?label, "starting section");
            sections.push(Section {
                label,
                header: cells,
                header_line: line_no,
                rows: Vec::new(),
            });
        } else if let Some(section) = sections.last_mut() {
            section.rows.push(DataRow {
                line: line_no,
                cells,
            });
        } else {
            // No marker anywhere yet: degraded single-section mode with
            // the first non-blank line as the header.
            debug!(line = line_no, "no section marker; single-section mode");
            sections.push(Section {
                label: None,
                header: cells,
                header_line: line_no,
                rows: Vec::new(),
            });
        }
    }

    sections
}

fn is_marker_line(line: &str) -> bool {
    line.to_lowercase().contains(SECTION_MARKER)
}

/// Extract the team-label candidate from a marker line: its first cell,
/// unless that cell is empty or is the marker itself.
fn label_candidate(line: &str) -> Option<String> {
    let cells = split_cells(line);
    let first = cells.first()?.trim_matches(|c| c == '"' || c == '\'').trim();
    if first.is_empty() || first.eq_ignore_ascii_case(SECTION_MARKER) {
        None
    } else {
        Some(first.to_string())
    }
}

/// Parse one raw line into trimmed cells, honoring CSV quoting.
pub fn split_cells(line: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(|c| c.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}
