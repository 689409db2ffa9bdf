//! Maximum-likelihood estimates from raw counts.

use super::table::{CountTable, ProbTable, TagCounts};
use crate::errors::{Error, Result};

/// `P(curr | prev) = count(prev, curr) / count(prev, *)`.
pub fn transition_probability(counts: &CountTable) -> Result<ProbTable> {
    let mut probs = ProbTable::default();
    for (prev, row) in counts.rows() {
        let total: u64 = row.values().sum();
        if total == 0 {
            return Err(Error::EmptyDistribution(prev.to_string()));
        }
        for (curr, &n) in row {
            probs.insert(prev, curr, n as f64 / total as f64);
        }
    }
    Ok(probs)
}

/// `P(word | tag) = count(tag, word) / count(tag)`.
pub fn emission_probability(counts: &CountTable, tags: &TagCounts) -> Result<ProbTable> {
    let mut probs = ProbTable::default();
    for (tag, row) in counts.rows() {
        let total = tags.get(tag);
        if total == 0 {
            return Err(Error::MissingTagCount(tag.to_string()));
        }
        for (word, &n) in row {
            probs.insert(tag, word, n as f64 / total as f64);
        }
    }
    Ok(probs)
}
