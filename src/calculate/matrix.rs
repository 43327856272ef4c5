//! All-pairs win-rate matrix.

use crate::ingest;
use crate::models::{
    CellValue, Ledger, Matrix, MatrixCell, MatrixOrigin, PvpMatrix, RawRow, Roster,
};

use super::win_percentage;

#[derive(Debug, Clone, Copy, Default)]
struct PairTally {
    wins: u32,
    games: u32,
}

/// Compute the matrix from decided matches between roster players.
///
/// Cell `(i, j)` is roster player `i`'s record against player `j`. The
/// diagonal is never computed.
pub fn build_matrix(roster: &Roster, ledger: &Ledger) -> PvpMatrix {
    let n = roster.len();
    if n < 2 {
        return PvpMatrix::Empty;
    }

    let mut tally = vec![vec![PairTally::default(); n]; n];
    for (_, outcome) in ledger.decided() {
        let (Some(w), Some(l)) = (
            roster.position(outcome.winner.as_str()),
            roster.position(outcome.loser.as_str()),
        ) else {
            continue;
        };
        if w == l {
            continue;
        }
        tally[w][l].wins += 1;
        tally[w][l].games += 1;
        tally[l][w].games += 1;
    }

    let players = roster.players().to_vec();
    let rows = players
        .iter()
        .enumerate()
        .map(|(i, row_player)| {
            players
                .iter()
                .enumerate()
                .map(|(j, col_player)| {
                    let t = tally[i][j];
                    let value = if i == j {
                        CellValue::NotApplicable
                    } else if t.games == 0 {
                        CellValue::NoData
                    } else {
                        CellValue::Record {
                            wins: t.wins,
                            total_games: Some(t.games),
                            win_pct: win_percentage(t.wins, t.games),
                        }
                    };
                    MatrixCell {
                        row_player: row_player.clone(),
                        col_player: col_player.clone(),
                        value,
                    }
                })
                .collect()
        })
        .collect();

    PvpMatrix::Grid(Matrix {
        players,
        origin: MatrixOrigin::Ledger,
        rows,
    })
}

/// Clean a precomputed grid into the same shape as [`build_matrix`].
pub fn matrix_from_external(rows: &[RawRow], roster: &Roster) -> PvpMatrix {
    if roster.len() < 2 {
        return PvpMatrix::Empty;
    }
    PvpMatrix::Grid(ingest::parse_external_matrix(rows, roster))
}
