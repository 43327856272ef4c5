//! Active win/lose streaks, replayed from the ledger.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{name_key, Ledger, PlayerName};

/// Which run of results to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Win,
    Lose,
}

impl fmt::Display for StreakKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreakKind::Win => write!(f, "win"),
            StreakKind::Lose => write!(f, "lose"),
        }
    }
}

impl FromStr for StreakKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "win" | "wins" | "winning" | "w" => Ok(StreakKind::Win),
            "lose" | "loss" | "losses" | "losing" | "l" => Ok(StreakKind::Lose),
            other => Err(format!("Unknown streak type \"{}\" (expected win or lose)", other)),
        }
    }
}

/// Running streak counters for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub win_streak: u32,
    pub lose_streak: u32,
}

impl StreakState {
    pub fn get(&self, kind: StreakKind) -> u32 {
        match kind {
            StreakKind::Win => self.win_streak,
            StreakKind::Lose => self.lose_streak,
        }
    }

    fn record_win(&mut self) {
        self.win_streak += 1;
        self.lose_streak = 0;
    }

    fn record_loss(&mut self) {
        self.lose_streak += 1;
        self.win_streak = 0;
    }
}

/// Streak state for every player seen in the ledger, in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct StreakTable {
    entries: Vec<(PlayerName, StreakState)>,
    index: HashMap<String, usize>,
}

impl StreakTable {
    fn entry(&mut self, player: &PlayerName) -> &mut StreakState {
        let key = player.key();
        let idx = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                self.entries.push((player.clone(), StreakState::default()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, player: &str) -> Option<StreakState> {
        self.index
            .get(&name_key(player))
            .map(|&i| self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(PlayerName, StreakState)> {
        self.entries.iter()
    }

    /// Players holding the longest active streak of `kind`.
    pub fn leaders(&self, kind: StreakKind) -> StreakReport {
        let length = self
            .entries
            .iter()
            .map(|(_, s)| s.get(kind))
            .max()
            .unwrap_or(0);

        if length == 0 {
            return StreakReport::NoActiveStreak { kind };
        }

        let players = self
            .entries
            .iter()
            .filter(|(_, s)| s.get(kind) == length)
            .map(|(p, _)| p.clone())
            .collect();

        StreakReport::Leaders {
            kind,
            length,
            players,
        }
    }
}

/// Result of a streak query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreakReport {
    Leaders {
        kind: StreakKind,
        length: u32,
        players: Vec<PlayerName>,
    },
    NoActiveStreak {
        kind: StreakKind,
    },
}

/// Replay decided matches in feed order.
///
/// The ledger order is taken as chronological and is not re-sorted.
pub fn replay_streaks(ledger: &Ledger) -> StreakTable {
    let mut table = StreakTable::default();
    for (_, outcome) in ledger.decided() {
        table.entry(&outcome.winner).record_win();
        table.entry(&outcome.loser).record_loss();
    }
    table
}
