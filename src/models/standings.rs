//! Standings rows.

use serde::{Deserialize, Serialize};

use super::PlayerName;

/// One player's line in the league table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    /// League position (1 = top)
    pub rank: u32,

    /// Player name as written in the standings sheet
    pub name: PlayerName,

    /// League points
    pub points: f64,

    pub matches_played: u32,

    pub matches_won: u32,

    pub games_won: u32,

    /// Match win percentage (0-100)
    pub match_win_pct: f64,

    /// Game win percentage (0-100)
    pub game_win_pct: f64,
}

impl StandingsRow {
    /// Create a row with only rank and name set.
    pub fn new(rank: u32, name: &str) -> Self {
        Self {
            rank,
            name: PlayerName::new(name),
            points: 0.0,
            matches_played: 0,
            matches_won: 0,
            games_won: 0,
            match_win_pct: 0.0,
            game_win_pct: 0.0,
        }
    }
}
