//! Loosely-typed rows as returned by the data source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// A single source row keyed by column header.
///
/// Headers arrive with arbitrary casing and spacing ("Player Name",
/// "player name", " PLAYERNAME"), so keys are stored folded: lowercased with
/// all whitespace removed. Lookups fold the requested header the same way.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct RawRow {
    cells: BTreeMap<String, String>,
}

/// Fold a column header into its lookup form.
pub fn fold_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and in-memory sources.
    pub fn with(mut self, header: &str, value: impl Into<String>) -> Self {
        self.insert(header, value);
        self
    }

    pub fn insert(&mut self, header: &str, value: impl Into<String>) {
        self.cells.insert(fold_header(header), value.into());
    }

    /// Raw cell value, untrimmed.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(&fold_header(header)).map(|s| s.as_str())
    }

    /// Trimmed cell value; blank cells read as `None`.
    pub fn text(&self, header: &str) -> Option<&str> {
        self.get(header).map(str::trim).filter(|s| !s.is_empty())
    }

    /// First non-blank value among several candidate headers.
    pub fn text_any(&self, headers: &[&str]) -> Option<&str> {
        headers.iter().find_map(|h| self.text(h))
    }

    /// Parse a numeric cell, tolerating a trailing `%` and thousands commas.
    pub fn number(&self, header: &str) -> Option<f64> {
        let text = self.text(header)?;
        let cleaned: String = text
            .trim_end_matches('%')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        cleaned.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Parse a non-negative integer cell. Whole-valued floats ("3.0") are accepted.
    pub fn count(&self, header: &str) -> Option<u32> {
        let n = self.number(header)?;
        if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
            return None;
        }
        Some(n as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.cells.serialize(serializer)
    }
}

impl From<BTreeMap<String, Value>> for RawRow {
    fn from(map: BTreeMap<String, Value>) -> Self {
        let mut row = RawRow::new();
        for (header, value) in map {
            let text = match value {
                Value::Null => String::new(),
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            row.insert(&header, text);
        }
        row
    }
}
