//! Pairwise match counts and remaining-match progress.

use serde::{Deserialize, Serialize};

use super::{rounded_percent, EngineError};
use crate::models::{Ledger, PlayerName, Roster};

/// Matches played between one player and each other roster member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCount {
    pub player: PlayerName,

    /// `(opponent, matches played)` in roster order
    pub counts: Vec<(PlayerName, u32)>,
}

impl PairCount {
    pub fn get(&self, opponent: &str) -> Option<u32> {
        self.counts
            .iter()
            .find(|(p, _)| p.matches(opponent))
            .map(|(_, c)| *c)
    }

    /// Sum over all opponents.
    pub fn total(&self) -> u32 {
        self.counts.iter().map(|(_, c)| c).sum()
    }
}

/// Count meetings between `player` and every other roster member.
///
/// Every match involving the player and a roster opponent counts once,
/// decided or not. Opponents outside the roster are ignored.
pub fn pair_counts(player: &str, roster: &Roster, ledger: &Ledger) -> Result<PairCount, EngineError> {
    let target = roster
        .resolve(player)
        .ok_or_else(|| EngineError::PlayerNotFound(player.trim().to_string()))?;
    let target_pos = roster.position(target.as_str());

    let mut counts = vec![0u32; roster.len()];
    for record in ledger.iter() {
        let Some(opponent) = record.opponent_of(target.as_str()) else {
            continue;
        };
        match roster.position(opponent.as_str()) {
            Some(pos) if Some(pos) != target_pos => counts[pos] += 1,
            _ => {}
        }
    }

    let counts: Vec<(PlayerName, u32)> = roster
        .iter()
        .zip(counts)
        .enumerate()
        .filter(|(i, _)| Some(*i) != target_pos)
        .map(|(_, (p, c))| (p.clone(), c))
        .collect();

    Ok(PairCount {
        player: target.clone(),
        counts,
    })
}

/// Remaining meetings against one opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentProgress {
    pub opponent: PlayerName,
    pub played: u32,
    pub remaining: u32,
}

/// How far a player is through their schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub player: PlayerName,

    /// Matches played against roster opponents
    pub played: u32,

    /// Scheduled matches: (roster size - 1) * cap, saturating at `u32::MAX`
    pub total: u32,

    /// `played / total` as a whole percentage, at most 100
    pub percent: u32,

    pub match_cap: u32,

    /// Most remaining first, then by opponent name
    pub per_opponent: Vec<OpponentProgress>,
}

/// Progress report for one player against a per-pair cap.
///
/// Pairs that met more often than the cap report 0 remaining.
pub fn progress(
    player: &str,
    roster: &Roster,
    ledger: &Ledger,
    match_cap: u32,
) -> Result<Progress, EngineError> {
    let counts = pair_counts(player, roster, ledger)?;

    let played = counts.total();
    let total = (counts.counts.len() as u32).saturating_mul(match_cap);
    let percent = rounded_percent(played, total).min(100);

    let mut per_opponent: Vec<OpponentProgress> = counts
        .counts
        .iter()
        .map(|(opponent, played)| OpponentProgress {
            opponent: opponent.clone(),
            played: *played,
            remaining: match_cap.saturating_sub(*played),
        })
        .collect();
    per_opponent.sort_by(|a, b| {
        b.remaining
            .cmp(&a.remaining)
            .then_with(|| a.opponent.key().cmp(&b.opponent.key()))
            .then_with(|| a.opponent.as_str().cmp(b.opponent.as_str()))
    });

    Ok(Progress {
        player: counts.player,
        played,
        total,
        percent,
        match_cap,
        per_opponent,
    })
}
