//! Normalization of raw source rows.
//!
//! Turns the loosely-typed rows handed over by a data source into the
//! engine's canonical models:
//! - roster and standings rows from the standings resource
//! - the match ledger from the match resource
//! - a matrix from an optional precomputed grid
//!
//! Malformed rows are dropped here and never reach the engine.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::{
    name_key, CellValue, Ledger, MatchRecord, Matrix, MatrixCell, MatrixOrigin, Outcome,
    PlayerName, RawRow, Roster, StandingsRow,
};

const NAME_HEADERS: &[&str] = &["Player Name", "Player", "Name"];
const P1_HEADERS: &[&str] = &["P1", "Player 1", "Player1"];
const P2_HEADERS: &[&str] = &["P2", "Player 2", "Player2"];

/// Build the roster from parsed standings rows, in source order.
///
/// Only rows that survive [`parse_standings`] register a player, so every
/// roster member has a standings row.
pub fn build_roster(standings: &[StandingsRow]) -> Roster {
    Roster::from_names(standings.iter().map(|r| r.name.as_str()))
}

/// Parse standings rows, keeping source order.
///
/// Rows without a name or a rank of at least 1 are dropped, as are repeated
/// names (first occurrence wins). Missing numeric columns read as zero.
pub fn parse_standings(rows: &[RawRow]) -> Vec<StandingsRow> {
    let mut seen = std::collections::HashSet::new();
    let mut parsed = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let Some(name) = row.text_any(NAME_HEADERS) else {
            debug!("Dropping standings row {}: no player name", i);
            continue;
        };
        let Some(rank) = row.count("Rank").filter(|r| *r >= 1) else {
            debug!("Dropping standings row {} ({}): invalid rank", i, name);
            continue;
        };
        if !seen.insert(name_key(name)) {
            debug!("Dropping standings row {}: duplicate player {}", i, name);
            continue;
        }

        parsed.push(StandingsRow {
            rank,
            name: PlayerName::new(name),
            points: row.number("Points").unwrap_or(0.0),
            matches_played: row.count("Matches Played").unwrap_or(0),
            matches_won: row.count("Matches Won").unwrap_or(0),
            games_won: row.count("Games Won").unwrap_or(0),
            match_win_pct: row.number("Match Win%").unwrap_or(0.0),
            game_win_pct: row.number("Game Win%").unwrap_or(0.0),
        });
    }

    parsed
}

/// Load the match ledger in feed order.
///
/// Names are resolved to the roster's casing where possible. Rows missing a
/// player, or pitting a player against themselves, are dropped. A row whose
/// winner and loser cannot be matched to either seat is kept without an
/// outcome.
pub fn load_ledger(rows: &[RawRow], roster: &Roster) -> Ledger {
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for (sequence_index, row) in rows.iter().enumerate() {
        let (Some(p1), Some(p2)) = (row.text_any(P1_HEADERS), row.text_any(P2_HEADERS)) else {
            dropped += 1;
            continue;
        };
        let player1 = roster.canonical_or_raw(p1);
        let player2 = roster.canonical_or_raw(p2);
        if player1 == player2 {
            debug!("Dropping match row {}: {} listed twice", sequence_index, player1);
            dropped += 1;
            continue;
        }

        let outcome = resolve_outcome(&player1, &player2, row.text("Winner"), row.text("Loser"));
        if outcome.is_none() {
            debug!(
                "Match row {} ({} vs {}) has no recognisable result",
                sequence_index, player1, player2
            );
        }

        records.push(MatchRecord {
            player1,
            player2,
            outcome,
            sequence_index,
        });
    }

    if dropped > 0 {
        debug!("Dropped {} malformed match rows", dropped);
    }

    Ledger::new(records)
}

fn resolve_outcome(
    player1: &PlayerName,
    player2: &PlayerName,
    winner: Option<&str>,
    loser: Option<&str>,
) -> Option<Outcome> {
    let p1_won = match (winner, loser) {
        (Some(w), _) if player1.matches(w) => true,
        (Some(w), _) if player2.matches(w) => false,
        (_, Some(l)) if player2.matches(l) => true,
        (_, Some(l)) if player1.matches(l) => false,
        _ => return None,
    };

    let (winner, loser) = if p1_won {
        (player1, player2)
    } else {
        (player2, player1)
    };
    Some(Outcome {
        winner: winner.clone(),
        loser: loser.clone(),
    })
}

fn cell_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)\s*\(\s*(\d+(?:\.\d+)?)\s*%?\s*\)$").expect("valid cell pattern")
    })
}

/// Parse a precomputed cell such as `"3 (60%)"`.
///
/// Returns `NoData` for blank, dash or otherwise unparseable cells.
pub fn parse_matrix_cell(text: &str) -> CellValue {
    let Some(caps) = cell_pattern().captures(text.trim()) else {
        return CellValue::NoData;
    };
    let (Ok(wins), Ok(win_pct)) = (caps[1].parse::<u32>(), caps[2].parse::<f64>()) else {
        return CellValue::NoData;
    };

    let total_games = if win_pct > 0.0 {
        Some((wins as f64 * 100.0 / win_pct).round() as u32)
    } else {
        None
    };

    CellValue::Record {
        wins,
        total_games,
        win_pct,
    }
}

/// Rebuild a matrix from a precomputed grid.
///
/// Each source row is labelled by player; each column is headed by a player
/// name. Row and column order come from the roster, never from the grid.
pub fn parse_external_matrix(rows: &[RawRow], roster: &Roster) -> Matrix {
    let mut by_player: HashMap<String, &RawRow> = HashMap::new();
    for row in rows {
        if let Some(label) = row.text_any(&["Player", "Player Name", "Name", ""]) {
            by_player.entry(name_key(label)).or_insert(row);
        }
    }

    let players = roster.players().to_vec();
    let grid = players
        .iter()
        .enumerate()
        .map(|(i, row_player)| {
            let source = by_player.get(&row_player.key());
            players
                .iter()
                .enumerate()
                .map(|(j, col_player)| {
                    let value = if i == j {
                        CellValue::NotApplicable
                    } else {
                        source
                            .and_then(|r| r.text(col_player.as_str()))
                            .map(parse_matrix_cell)
                            .unwrap_or(CellValue::NoData)
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

    Matrix {
        players,
        origin: MatrixOrigin::External,
        rows: grid,
    }
}
