//! Head-to-head record between two players.

use serde::{Deserialize, Serialize};

use super::{rounded_percent, EngineError};
use crate::models::{Ledger, PlayerName, Roster};

/// One side of a head-to-head record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTally {
    pub player: PlayerName,
    pub wins: u32,
    /// Share of decided meetings won, as a whole percentage
    pub percent: u32,
}

/// Result of a head-to-head query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HeadToHead {
    Record {
        first: PlayerTally,
        second: PlayerTally,
        total: u32,
    },
    /// The two players have no decided meetings.
    NoData {
        first: PlayerName,
        second: PlayerName,
    },
}

/// Tally decided meetings between two roster players.
///
/// The result is symmetric: swapping the arguments swaps `first` and `second`.
pub fn head_to_head(
    roster: &Roster,
    ledger: &Ledger,
    player1: &str,
    player2: &str,
) -> Result<HeadToHead, EngineError> {
    let first = resolve(roster, player1)?;
    let second = resolve(roster, player2)?;
    if first == second {
        return Err(EngineError::SamePlayer(first.to_string()));
    }

    let mut first_wins = 0u32;
    let mut second_wins = 0u32;
    for (record, outcome) in ledger.decided() {
        if !record.is_between(first.as_str(), second.as_str()) {
            continue;
        }
        if outcome.winner == first {
            first_wins += 1;
        } else if outcome.winner == second {
            second_wins += 1;
        }
    }

    let total = first_wins + second_wins;
    if total == 0 {
        return Ok(HeadToHead::NoData { first, second });
    }

    Ok(HeadToHead::Record {
        first: PlayerTally {
            player: first,
            wins: first_wins,
            percent: rounded_percent(first_wins, total),
        },
        second: PlayerTally {
            player: second,
            wins: second_wins,
            percent: rounded_percent(second_wins, total),
        },
        total,
    })
}

fn resolve(roster: &Roster, raw: &str) -> Result<PlayerName, EngineError> {
    roster
        .resolve(raw)
        .cloned()
        .ok_or_else(|| EngineError::PlayerNotFound(raw.trim().to_string()))
}
