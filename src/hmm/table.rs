use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::quark::{Quark, StringTable, TextVectorizer};

pub type Row<V> = BTreeMap<String, V>;

/// Two-level map `row -> column -> value`.
///
/// Absent cells are reported as `None`; nothing is created on lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table<V> {
    rows: BTreeMap<String, Row<V>>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self { rows: BTreeMap::new() }
    }
}

pub type CountTable = Table<u64>;
pub type ProbTable = Table<f64>;

impl<V: Copy> Table<V> {
    pub fn get(&self, row: &str, col: &str) -> Option<V> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn row(&self, row: &str) -> Option<&Row<V>> {
        self.rows.get(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &Row<V>)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn insert(&mut self, row: &str, col: &str, value: V) {
        self.rows.entry(row.to_string()).or_default().insert(col.to_string(), value);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CountTable {
    pub fn increment(&mut self, row: &str, col: &str) {
        if let Some(r) = self.rows.get_mut(row) {
            match r.get_mut(col) {
                Some(c) => *c += 1,
                None => {
                    r.insert(col.to_string(), 1);
                }
            }
            return;
        }
        self.rows.entry(row.to_string()).or_default().insert(col.to_string(), 1);
    }

    pub fn row_total(&self, row: &str) -> u64 {
        self.rows.get(row).map(|r| r.values().sum()).unwrap_or_default()
    }
}

/// Occurrence totals per tag, in first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCounts {
    tags: Quark,
    counts: Vec<u64>,
}

impl TagCounts {
    pub fn increment(&mut self, tag: &str) {
        let id = self.tags.find_or_insert(tag);
        if id == self.counts.len() {
            self.counts.push(0);
        }
        self.counts[id] += 1;
    }

    /// Zero for a tag never seen.
    pub fn get(&self, tag: &str) -> u64 {
        self.tags.to_id(tag).map(|id| self.counts[id]).unwrap_or_default()
    }

    pub fn vocabulary(&self) -> &Quark {
        &self.tags
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.tags.iter().zip(self.counts.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The tag with the highest total; the earliest seen wins a tie.
    pub fn most_frequent(&self) -> Option<&str> {
        let mut best: Option<(&str, u64)> = None;
        for (tag, n) in self.iter() {
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((tag, n));
            }
        }
        best.map(|(tag, _)| tag)
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.tags.len() == self.counts.len()
    }
}
