use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
    time::Instant,
};

use serde::{Deserialize, Serialize};

use super::{
    counter::{Counter, Counts, Record},
    estimator::{emission_probability, transition_probability},
    table::{ProbTable, Row, TagCounts},
    tagger::HmmTagger,
    END_TAG, START_TAG,
};
use crate::{
    config::DecoderConfig,
    errors::{Error, Result},
    quark::Quark,
};

/// A trained first-order HMM.
///
/// Built once from a tagged corpus and read-only afterwards. Any number of
/// taggers may borrow the same model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    tags: TagCounts,
    transitions: ProbTable,
    emissions: ProbTable,
}

impl Model {
    pub fn train<'a, I: IntoIterator<Item = Record<'a>>>(records: I) -> Result<Self> {
        let begin = Instant::now();
        let counts: Counts = records.into_iter().collect();
        let model = Self::from_counts(&counts)?;
        log::info!("trained model (tags: {}, time cost: {:?})", model.tags.len(), begin.elapsed());
        Ok(model)
    }

    /// Trains on a tagged corpus: one `word<TAB>tag` per line, blank line
    /// between sentences.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let begin = Instant::now();
        let counts = Counter::default().read(reader)?;
        let model = Self::from_counts(&counts)?;
        log::info!(
            "trained model (sentences: {}, tags: {}, time cost: {:?})",
            counts.sentences,
            model.tags.len(),
            begin.elapsed()
        );
        Ok(model)
    }

    pub fn from_counts(counts: &Counts) -> Result<Self> {
        Ok(Self {
            tags: counts.tags.clone(),
            transitions: transition_probability(&counts.transitions)?,
            emissions: emission_probability(&counts.emissions, &counts.tags)?,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path)?;
        let model: Self = serde_json::from_reader(BufReader::new(f))?;
        model.validate()?;
        log::info!("loaded model from {} ({} tags)", path.display(), model.tags.len());
        Ok(model)
    }

    pub fn from_memory(buffer: &[u8]) -> Result<Self> {
        let model: Self = serde_json::from_slice(buffer)?;
        model.validate()?;
        Ok(model)
    }

    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut w = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut w, self)?;
        w.flush()?;
        log::info!("write model to {}", path.display());
        Ok(())
    }

    /// `P(curr | prev)`, `None` when the pair never occurred in training.
    pub fn transition(&self, prev: &str, curr: &str) -> Option<f64> {
        self.transitions.get(prev, curr)
    }

    /// `P(word | tag)`, `None` when the pair never occurred in training.
    pub fn emission(&self, tag: &str, word: &str) -> Option<f64> {
        self.emissions.get(tag, word)
    }

    pub(crate) fn emission_row(&self, tag: &str) -> Option<&Row<f64>> {
        self.emissions.row(tag)
    }

    pub fn transitions(&self) -> &ProbTable {
        &self.transitions
    }

    pub fn emissions(&self) -> &ProbTable {
        &self.emissions
    }

    /// Hidden states, in first-seen training order. Excludes the sentinels.
    pub fn vocabulary(&self) -> &Quark {
        self.tags.vocabulary()
    }

    pub fn tag_counts(&self) -> &TagCounts {
        &self.tags
    }

    pub fn most_frequent_tag(&self) -> Option<&str> {
        self.tags.most_frequent()
    }

    pub fn num_tags(&self) -> usize {
        self.tags.len()
    }

    pub fn tagger(&self, config: &DecoderConfig) -> Result<HmmTagger<'_>> {
        HmmTagger::new(self, config)
    }

    fn validate(&self) -> Result<()> {
        if !self.tags.is_consistent() {
            return Err(Error::InvalidModel("tag vocabulary and tag counts differ in length".to_string()));
        }
        let vocab = self.vocabulary();
        for (tag, _) in self.emissions.rows() {
            if !vocab.contains(tag) {
                return Err(Error::InvalidModel(format!("emissions for unknown tag {tag:?}")));
            }
        }
        for (prev, row) in self.transitions.rows() {
            if prev != START_TAG && !vocab.contains(prev) {
                return Err(Error::InvalidModel(format!("transitions from unknown tag {prev:?}")));
            }
            if let Some(curr) = row.keys().find(|curr| curr.as_str() != END_TAG && !vocab.contains(curr)) {
                return Err(Error::InvalidModel(format!("transition {prev:?} -> unknown tag {curr:?}")));
            }
        }
        check_probabilities("transition", &self.transitions)?;
        check_probabilities("emission", &self.emissions)
    }
}

/// Every stored probability must lie in `(0, 1]`.
fn check_probabilities(kind: &str, table: &ProbTable) -> Result<()> {
    for (row, cols) in table.rows() {
        if let Some((col, p)) = cols.iter().find(|&(_, &p)| !(p > 0.0 && p <= 1.0)) {
            return Err(Error::InvalidModel(format!("{kind} probability {p} for {row:?} -> {col:?}")));
        }
    }
    Ok(())
}
