//! Match records and the chronological ledger.

use serde::{Deserialize, Serialize};

use super::PlayerName;

/// The decided result of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: PlayerName,
    pub loser: PlayerName,
}

/// A single recorded match between two players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub player1: PlayerName,

    pub player2: PlayerName,

    /// `None` when the source row named no recognisable winner or loser.
    /// The pairing still counts as played.
    pub outcome: Option<Outcome>,

    /// Position of the row in the source feed
    pub sequence_index: usize,
}

impl MatchRecord {
    /// Create a decided match. `winner` must be one of the two players.
    pub fn decided(player1: &str, player2: &str, winner: &str, sequence_index: usize) -> Self {
        let player1 = PlayerName::new(player1);
        let player2 = PlayerName::new(player2);
        let outcome = if player1.matches(winner) {
            Some(Outcome {
                winner: player1.clone(),
                loser: player2.clone(),
            })
        } else if player2.matches(winner) {
            Some(Outcome {
                winner: player2.clone(),
                loser: player1.clone(),
            })
        } else {
            None
        };
        Self {
            player1,
            player2,
            outcome,
            sequence_index,
        }
    }

    pub fn winner(&self) -> Option<&PlayerName> {
        self.outcome.as_ref().map(|o| &o.winner)
    }

    pub fn loser(&self) -> Option<&PlayerName> {
        self.outcome.as_ref().map(|o| &o.loser)
    }

    /// Whether `raw` is one of the two participants.
    pub fn involves(&self, raw: &str) -> bool {
        self.player1.matches(raw) || self.player2.matches(raw)
    }

    /// The other participant, if `raw` is one of them.
    pub fn opponent_of(&self, raw: &str) -> Option<&PlayerName> {
        if self.player1.matches(raw) {
            Some(&self.player2)
        } else if self.player2.matches(raw) {
            Some(&self.player1)
        } else {
            None
        }
    }

    /// Whether this match was between exactly `a` and `b`, in either seat.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.player1.matches(a) && self.player2.matches(b))
            || (self.player1.matches(b) && self.player2.matches(a))
    }
}

/// Matches in source feed order.
///
/// The feed order is the chronological order; nothing in the engine re-sorts it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    records: Vec<MatchRecord>,
}

impl Ledger {
    pub fn new(records: Vec<MatchRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchRecord> {
        self.records.iter()
    }

    /// Matches with a decided outcome, in feed order.
    pub fn decided(&self) -> impl Iterator<Item = (&MatchRecord, &Outcome)> {
        self.records
            .iter()
            .filter_map(|m| m.outcome.as_ref().map(|o| (m, o)))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decided_resolves_winner_seat() {
        let m = MatchRecord::decided("Alice", "Bob", "bob", 0);
        assert_eq!(m.winner().unwrap().as_str(), "Bob");
        assert_eq!(m.loser().unwrap().as_str(), "Alice");
    }

    #[test]
    fn test_decided_unknown_winner_has_no_outcome() {
        let m = MatchRecord::decided("Alice", "Bob", "Carol", 0);
        assert!(m.outcome.is_none());
    }

    #[test]
    fn test_pair_helpers() {
        let m = MatchRecord::decided("Alice", "Bob", "Alice", 3);
        assert!(m.involves("ALICE"));
        assert!(!m.involves("Carol"));
        assert_eq!(m.opponent_of("bob").unwrap().as_str(), "Alice");
        assert!(m.is_between("bob", "alice"));
        assert!(!m.is_between("alice", "carol"));
    }
}
