//! Statistics calculation engine.
//!
//! Pure computations over one [`LeagueSnapshot`]:
//! - standings ordering and per-player stats
//! - remaining-match progress against each opponent
//! - active win/lose streaks
//! - head-to-head records
//! - the all-pairs win-rate matrix
//!
//! Nothing here performs I/O or keeps state between calls.

mod head_to_head;
mod matrix;
mod progress;
mod streaks;

pub use head_to_head::*;
pub use matrix::*;
pub use progress::*;
pub use streaks::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ingest;
use crate::models::{Ledger, LeagueSnapshot, PvpMatrix, RawRow, Roster, StandingsRow};

/// Default number of meetings expected between each pair of players.
pub const DEFAULT_MATCH_CAP: u32 = 5;

/// Errors the engine reports for requests it cannot service.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("No player named \"{0}\"")]
    PlayerNotFound(String),

    #[error("Snapshot contains no players")]
    EmptyRoster,

    #[error("Cannot compare {0} with themselves")]
    SamePlayer(String),
}

/// Per-league knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueSettings {
    /// Expected meetings per pair (K)
    pub match_cap: u32,

    /// Use the source's precomputed matrix when one is present
    pub prefer_external_matrix: bool,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        Self {
            match_cap: DEFAULT_MATCH_CAP,
            prefer_external_matrix: true,
        }
    }
}

/// Round `part / whole` to a whole percentage. An empty whole is 0%.
pub fn rounded_percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as u32
    }
}

/// Win percentage (0-100) from wins and games played.
pub fn win_percentage(wins: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64 * 100.0
    }
}

/// A normalized, read-only view of one snapshot.
#[derive(Debug, Clone)]
pub struct League {
    roster: Roster,
    standings: Vec<StandingsRow>,
    ledger: Ledger,
    external_matrix: Option<Vec<RawRow>>,
    settings: LeagueSettings,
}

impl League {
    /// Normalize a snapshot. Fails only when it has no players at all.
    pub fn from_snapshot(
        snapshot: &LeagueSnapshot,
        settings: LeagueSettings,
    ) -> Result<Self, EngineError> {
        let standings = ingest::parse_standings(&snapshot.standings);
        let roster = ingest::build_roster(&standings);
        if roster.is_empty() {
            return Err(EngineError::EmptyRoster);
        }

        let ledger = ingest::load_ledger(&snapshot.matches, &roster);
        debug!(
            "League loaded: {} players, {} standings rows, {} matches",
            roster.len(),
            standings.len(),
            ledger.len()
        );

        Ok(Self {
            roster,
            standings,
            ledger,
            external_matrix: snapshot.matrix.clone(),
            settings,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn settings(&self) -> LeagueSettings {
        self.settings
    }

    /// Standings ordered by rank ascending. Equal ranks keep source order.
    pub fn standings(&self) -> Vec<StandingsRow> {
        let mut rows = self.standings.clone();
        rows.sort_by_key(|r| r.rank);
        rows
    }

    /// A single player's standings row.
    pub fn stats(&self, player: &str) -> Result<StandingsRow, EngineError> {
        self.standings
            .iter()
            .find(|r| r.name.matches(player))
            .cloned()
            .ok_or_else(|| EngineError::PlayerNotFound(player.trim().to_string()))
    }

    pub fn remaining(&self, player: &str) -> Result<Progress, EngineError> {
        progress(player, &self.roster, &self.ledger, self.settings.match_cap)
    }

    pub fn streaks(&self, kind: StreakKind) -> StreakReport {
        replay_streaks(&self.ledger).leaders(kind)
    }

    pub fn pvp(&self, player1: &str, player2: &str) -> Result<HeadToHead, EngineError> {
        head_to_head(&self.roster, &self.ledger, player1, player2)
    }

    /// The pairwise matrix, from the precomputed grid when configured and present.
    pub fn pvp_matrix(&self) -> PvpMatrix {
        match &self.external_matrix {
            Some(rows) if self.settings.prefer_external_matrix => {
                matrix_from_external(rows, &self.roster)
            }
            _ => build_matrix(&self.roster, &self.ledger),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{LeagueSnapshot, RawRow};

    pub fn standings_row(rank: u32, name: &str) -> RawRow {
        RawRow::new()
            .with("Rank", rank.to_string())
            .with("Player Name", name)
            .with("Points", (12 - rank * 3).to_string())
            .with("Matches Played", "4")
            .with("Matches Won", (4 - rank).to_string())
            .with("Games Won", "5")
            .with("Match Win%", "50%")
            .with("Game Win%", "50%")
    }

    pub fn match_row(p1: &str, p2: &str, winner: &str) -> RawRow {
        let loser = if winner == p1 { p2 } else { p1 };
        RawRow::new()
            .with("P1", p1)
            .with("P2", p2)
            .with("Winner", winner)
            .with("Loser", loser)
    }

    /// Alice, Bob, Carol with the given `(p1, p2, winner)` matches.
    pub fn snapshot(matches: &[(&str, &str, &str)]) -> LeagueSnapshot {
        LeagueSnapshot::new(
            vec![
                standings_row(1, "Alice"),
                standings_row(2, "Bob"),
                standings_row(3, "Carol"),
            ],
            matches
                .iter()
                .map(|(p1, p2, w)| match_row(p1, p2, w))
                .collect(),
        )
    }
}
