//! Line-oriented corpus formats.
//!
//! Tagged corpus: one `word<TAB>tag` per line, sentences separated by a blank
//! line. Untagged input: one word per line, same sentence separation.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    str::Lines,
};

use crate::hmm::{counter::SEPARATOR, Record};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TaggedSentence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

impl TaggedSentence {
    pub fn push(&mut self, word: &str, tag: &str) {
        self.words.push(word.to_string());
        self.tags.push(tag.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// The sentence as training records, closed by a boundary.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.words
            .iter()
            .zip(&self.tags)
            .map(|(word, tag)| Record::Token { word: word.as_str(), tag: tag.as_str() })
            .chain(std::iter::once(Record::Boundary))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset {
    pub sentences: Vec<TaggedSentence>,
}

impl Dataset {
    /// Reads a tagged corpus. Malformed lines are skipped, empty sentences
    /// dropped.
    pub fn read<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut builder = Builder::default();
        for line in reader.lines() {
            builder.line(&line?);
        }
        Ok(builder.finish())
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaggedSentence> {
        self.sentences.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.sentences.iter().flat_map(|s| s.records())
    }

    pub fn max_length(&self) -> usize {
        self.sentences.iter().map(|x| x.len()).max().unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.sentences.iter().map(|x| x.len()).sum()
    }
}

#[derive(Default)]
struct Builder {
    dataset: Dataset,
    sentence: TaggedSentence,
}

impl Builder {
    fn line(&mut self, line: &str) {
        match Record::parse(line) {
            Some(Record::Token { word, tag }) => self.sentence.push(word, tag),
            Some(Record::Boundary) => self.flush(),
            None => {}
        }
    }

    fn flush(&mut self) {
        if !self.sentence.is_empty() {
            self.dataset.sentences.push(std::mem::take(&mut self.sentence));
        }
    }

    fn finish(mut self) -> Dataset {
        self.flush();
        self.dataset
    }
}

impl TryFrom<File> for Dataset {
    type Error = io::Error;

    fn try_from(value: File) -> Result<Self, Self::Error> {
        Self::read(BufReader::new(value))
    }
}

impl<'a> From<Lines<'a>> for Dataset {
    fn from(value: Lines<'a>) -> Self {
        let mut builder = Builder::default();
        for line in value {
            builder.line(line);
        }
        builder.finish()
    }
}

/// Reads untagged sentences: one word per line, blank line between
/// sentences.
pub fn read_sentences<R: BufRead>(reader: R) -> io::Result<Vec<Vec<String>>> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if word.is_empty() {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
        } else {
            current.push(word.to_string());
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    Ok(sentences)
}

/// Writes one sentence as `word<TAB>tag` lines followed by a blank line.
pub fn write_tagged<W: Write, S: AsRef<str>, T: AsRef<str>>(w: &mut W, words: &[S], tags: &[T]) -> io::Result<()> {
    for (word, tag) in words.iter().zip(tags) {
        writeln!(w, "{}{}{}", word.as_ref(), SEPARATOR, tag.as_ref())?;
    }
    writeln!(w)
}
