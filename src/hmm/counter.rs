use std::io::BufRead;

use super::table::{CountTable, TagCounts};
use super::{END_TAG, START_TAG};
use crate::errors::Result;

/// Field separator of a tagged corpus line.
pub const SEPARATOR: char = '\t';

/// One line of a tagged corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    Token { word: &'a str, tag: &'a str },
    Boundary,
}

impl<'a> Record<'a> {
    /// Returns `None` for a malformed line: anything other than exactly two
    /// non-empty TAB separated fields.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Some(Record::Boundary);
        }
        let (word, tag) = line.split_once(SEPARATOR)?;
        if word.is_empty() || tag.is_empty() || tag.contains(SEPARATOR) {
            return None;
        }
        Some(Record::Token { word, tag })
    }
}

/// Raw counts gathered in one pass over a tagged corpus.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Counts {
    /// prev tag -> tag, including the `start` and `end` sentinels.
    pub transitions: CountTable,
    /// tag -> word.
    pub emissions: CountTable,
    pub tags: TagCounts,
    /// Sentences holding at least one token, the unterminated last one included.
    pub sentences: usize,
}

#[derive(Debug)]
pub struct Counter {
    counts: Counts,
    prev: String,
}

impl Default for Counter {
    fn default() -> Self {
        Self { counts: Counts::default(), prev: START_TAG.to_string() }
    }
}

impl Counter {
    pub fn update(&mut self, record: Record<'_>) {
        match record {
            Record::Token { word, tag } => {
                self.counts.transitions.increment(&self.prev, tag);
                self.counts.emissions.increment(tag, word);
                self.counts.tags.increment(tag);
                self.prev.clear();
                self.prev.push_str(tag);
            }
            Record::Boundary => self.close_sentence(),
        }
    }

    /// Feeds one raw line; malformed lines are dropped without touching state.
    pub fn update_line(&mut self, line: &str) {
        if let Some(record) = Record::parse(line) {
            self.update(record);
        }
    }

    /// Reads a whole tagged corpus.
    pub fn read<R: BufRead>(mut self, reader: R) -> Result<Counts> {
        for line in reader.lines() {
            self.update_line(&line?);
        }
        Ok(self.finish())
    }

    pub fn num_sentences(&self) -> usize {
        self.counts.sentences + usize::from(self.prev != START_TAG)
    }

    /// Ends the pass. A sentence left open at end of input keeps its tokens
    /// but gets no `end` transition: only a boundary counts one.
    pub fn finish(mut self) -> Counts {
        self.counts.sentences = self.num_sentences();
        self.counts
    }

    /// Every boundary counts `prev -> end`, so leading and repeated blank
    /// lines count `start -> end`.
    fn close_sentence(&mut self) {
        if self.prev != START_TAG {
            self.counts.sentences += 1;
        }
        self.counts.transitions.increment(&self.prev, END_TAG);
        self.prev.clear();
        self.prev.push_str(START_TAG);
    }
}

impl<'a> FromIterator<Record<'a>> for Counts {
    fn from_iter<I: IntoIterator<Item = Record<'a>>>(iter: I) -> Self {
        let mut counter = Counter::default();
        for record in iter {
            counter.update(record);
        }
        counter.finish()
    }
}
