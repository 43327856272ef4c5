//! All-pairs win-rate matrix.

use serde::{Deserialize, Serialize};

use super::PlayerName;

/// The contents of one matrix cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellValue {
    /// Diagonal: a player against themselves.
    NotApplicable,

    /// The pair has no recorded games.
    NoData,

    /// Row player's record against the column player.
    Record {
        wins: u32,
        /// `None` only for precomputed grids where the total cannot be recovered
        total_games: Option<u32>,
        win_pct: f64,
    },
}

/// One directional cell: row player versus column player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub row_player: PlayerName,
    pub col_player: PlayerName,
    pub value: CellValue,
}

impl MatrixCell {
    pub fn wins_of_row(&self) -> u32 {
        match self.value {
            CellValue::Record { wins, .. } => wins,
            _ => 0,
        }
    }

    pub fn total_games(&self) -> Option<u32> {
        match self.value {
            CellValue::Record { total_games, .. } => total_games,
            CellValue::NoData => Some(0),
            CellValue::NotApplicable => None,
        }
    }

    /// Win percentage, `None` on the diagonal and for pairs with no games.
    pub fn win_pct(&self) -> Option<f64> {
        match self.value {
            CellValue::Record { win_pct, .. } => Some(win_pct),
            _ => None,
        }
    }
}

/// Where a matrix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixOrigin {
    /// Computed from the match ledger
    Ledger,
    /// Parsed from a precomputed external grid
    External,
}

/// Dense N×N grid in roster order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub players: Vec<PlayerName>,
    pub origin: MatrixOrigin,
    /// `rows[i][j]` is `players[i]` versus `players[j]`
    pub rows: Vec<Vec<MatrixCell>>,
}

impl Matrix {
    pub fn cell(&self, row: usize, col: usize) -> Option<&MatrixCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn size(&self) -> usize {
        self.players.len()
    }
}

/// Result of a matrix query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PvpMatrix {
    Grid(Matrix),
    /// Fewer than two players: there are no pairs to show.
    Empty,
}
