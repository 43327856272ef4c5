//! Player names and the league roster.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A player's display name.
///
/// The display casing is preserved, but all comparisons go through
/// [`PlayerName::key`], which trims and lowercases.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    /// Create a name from raw input, trimming surrounding whitespace.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    /// Get the display form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lookup key: trimmed and lowercased.
    pub fn key(&self) -> String {
        name_key(&self.0)
    }

    /// Case-insensitive comparison against a raw name.
    pub fn matches(&self, raw: &str) -> bool {
        self.key() == name_key(raw)
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

/// Normalize a raw name into its lookup key.
pub fn name_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl PartialEq for PlayerName {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PlayerName {}

impl std::hash::Hash for PlayerName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerName({})", self.0)
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

/// The canonical, de-duplicated list of registered players.
///
/// Order is significant: it is the column order of the matrix.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Roster {
    players: Vec<PlayerName>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Roster {
    /// Build a roster from raw names. Blank names are skipped and
    /// case-insensitive duplicates collapse to their first occurrence.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = Self::default();
        for raw in names {
            roster.push(PlayerName::new(raw.as_ref()));
        }
        roster
    }

    fn push(&mut self, name: PlayerName) {
        if name.is_blank() {
            return;
        }
        let key = name.key();
        if self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key, self.players.len());
        self.players.push(name);
    }

    /// Resolve a raw name to the roster's canonical entry.
    pub fn resolve(&self, raw: &str) -> Option<&PlayerName> {
        self.index.get(&name_key(raw)).map(|&i| &self.players[i])
    }

    /// Position of a player in roster order.
    pub fn position(&self, raw: &str) -> Option<usize> {
        self.index.get(&name_key(raw)).copied()
    }

    /// Canonical roster casing when known, otherwise the trimmed raw value.
    pub fn canonical_or_raw(&self, raw: &str) -> PlayerName {
        self.resolve(raw)
            .cloned()
            .unwrap_or_else(|| PlayerName::new(raw))
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.index.contains_key(&name_key(raw))
    }

    pub fn players(&self) -> &[PlayerName] {
        &self.players
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerName> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_name_trims_and_compares_case_insensitively() {
        let a = PlayerName::new("  Alice ");
        assert_eq!(a.as_str(), "Alice");
        assert_eq!(a, PlayerName::new("ALICE"));
        assert!(a.matches(" alice"));
        assert!(!a.matches("alicia"));
    }

    #[test]
    fn test_roster_first_occurrence_wins() {
        let roster = Roster::from_names(["Alice", "bob", "ALICE", "Bob ", "Carol"]);
        let names: Vec<&str> = roster.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["Alice", "bob", "Carol"]);
    }

    #[test]
    fn test_roster_skips_blank_names() {
        let roster = Roster::from_names(["", "  ", "Dana"]);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_roster_resolve_uses_roster_casing() {
        let roster = Roster::from_names(["McAllister"]);
        assert_eq!(roster.resolve("mcallister").unwrap().as_str(), "McAllister");
        assert_eq!(roster.canonical_or_raw(" MCALLISTER ").as_str(), "McAllister");
        assert_eq!(roster.canonical_or_raw(" Stranger ").as_str(), "Stranger");
        assert_eq!(roster.position("MCALLISTER"), Some(0));
        assert!(roster.resolve("nobody").is_none());
    }
}
