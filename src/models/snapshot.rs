//! Frozen source data for one query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RawRow;

/// Everything the engine needs, fetched up front.
///
/// A snapshot is acquired once per request and never refreshed in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    /// Standings resource rows, in source order
    pub standings: Vec<RawRow>,

    /// Match ledger rows, in source (chronological) order
    pub matches: Vec<RawRow>,

    /// Precomputed pairwise grid, when the source provides one
    pub matrix: Option<Vec<RawRow>>,

    /// When the snapshot was taken
    pub fetched_at: DateTime<Utc>,
}

impl LeagueSnapshot {
    pub fn new(standings: Vec<RawRow>, matches: Vec<RawRow>) -> Self {
        Self {
            standings,
            matches,
            matrix: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_matrix(mut self, matrix: Vec<RawRow>) -> Self {
        self.matrix = Some(matrix);
        self
    }
}
