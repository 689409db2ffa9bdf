//! Batch tagging with per-sentence failure isolation.

use std::io::Write;

use crate::{dataset::write_tagged, errors::Error, hmm::Tagger, Result};

/// Result of decoding one sentence.
#[derive(Debug)]
pub enum SentenceOutcome {
    Tagged(Vec<String>),
    Failed { reason: Error },
}

impl SentenceOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SentenceOutcome::Failed { .. })
    }

    /// The decoded tags, or `len` copies of `fallback` for a failed sentence.
    pub fn into_tags(self, fallback: &str, len: usize) -> Vec<String> {
        match self {
            SentenceOutcome::Tagged(tags) => tags,
            SentenceOutcome::Failed { .. } => vec![fallback.to_string(); len],
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaggingSummary {
    pub sentences: usize,
    pub tokens: usize,
    pub failures: usize,
}

pub fn tag_sentence<T: Tagger, S: AsRef<str>>(tagger: &mut T, words: &[S]) -> SentenceOutcome {
    match tagger.tag(words) {
        Ok(tags) if tags.len() == words.len() => SentenceOutcome::Tagged(tags),
        Ok(tags) => SentenceOutcome::Failed { reason: Error::LengthMismatch { words: words.len(), tags: tags.len() } },
        Err(reason) => SentenceOutcome::Failed { reason },
    }
}

pub fn tag_sentences<T: Tagger, S: AsRef<str>>(tagger: &mut T, sentences: &[Vec<S>]) -> Vec<SentenceOutcome> {
    sentences.iter().map(|words| tag_sentence(tagger, words)).collect()
}

/// Decodes sentence `index` of a batch. A failure is logged and replaced by
/// the fallback tag on every word; the flag is `true` in that case.
pub fn tag_or_fallback<T: Tagger, S: AsRef<str>>(tagger: &mut T, index: usize, words: &[S]) -> (Vec<String>, bool) {
    let outcome = tag_sentence(tagger, words);
    let failed = outcome.is_failed();
    if let SentenceOutcome::Failed { reason } = &outcome {
        log::warn!("skipping sentence {index} due to error: {reason}");
    }
    (outcome.into_tags(tagger.fallback(), words.len()), failed)
}

/// Tags every sentence in order and writes `word<TAB>tag` output.
///
/// A sentence that fails to decode is logged and written with the fallback
/// tag on every word; the remaining sentences are still processed.
pub fn tag_corpus<T: Tagger, S: AsRef<str>, W: Write>(
    tagger: &mut T,
    sentences: &[Vec<S>],
    writer: &mut W,
) -> Result<TaggingSummary> {
    let mut summary = TaggingSummary::default();
    for (i, words) in sentences.iter().enumerate() {
        let (tags, failed) = tag_or_fallback(tagger, i, words);
        if failed {
            summary.failures += 1;
        }
        write_tagged(writer, words, &tags)?;
        summary.sentences += 1;
        summary.tokens += words.len();
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::DecoderConfig, hmm::Model};

    /// Refuses any sentence containing "boom".
    struct Exploding {
        len: usize,
    }

    impl Tagger for Exploding {
        fn set_sequence<S: AsRef<str>>(&mut self, words: &[S]) -> Result<()> {
            if words.iter().any(|w| w.as_ref() == "boom") {
                return Err(Error::InvalidModel("boom".to_string()));
            }
            self.len = words.len();
            Ok(())
        }

        fn len(&self) -> usize {
            self.len
        }

        fn viterbi(&mut self) -> Result<Vec<String>> {
            Ok(vec!["X".to_string(); self.len])
        }

        fn fallback(&self) -> &str {
            "FB"
        }
    }

    fn sentences(v: &[&[&str]]) -> Vec<Vec<String>> {
        v.iter().map(|s| s.iter().map(|w| w.to_string()).collect()).collect()
    }

    #[test]
    fn failures_are_isolated() {
        let input = sentences(&[&["a", "b"], &["c", "boom", "d"], &["e"]]);
        let mut tagger = Exploding { len: 0 };
        let outcomes = tag_sentences(&mut tagger, &input);
        assert_eq!(outcomes.iter().map(SentenceOutcome::is_failed).collect::<Vec<_>>(), vec![false, true, false]);

        let mut out = Vec::new();
        let summary = tag_corpus(&mut tagger, &input, &mut out).unwrap();
        assert_eq!(summary, TaggingSummary { sentences: 3, tokens: 6, failures: 1 });
        assert_eq!(String::from_utf8(out).unwrap(), "a\tX\nb\tX\n\nc\tFB\nboom\tFB\nd\tFB\n\ne\tX\n\n");
    }

    /// Claims one tag too many for every sentence.
    struct Overlong;

    impl Tagger for Overlong {
        fn set_sequence<S: AsRef<str>>(&mut self, _words: &[S]) -> Result<()> {
            Ok(())
        }

        fn len(&self) -> usize {
            0
        }

        fn viterbi(&mut self) -> Result<Vec<String>> {
            Ok(vec!["X".to_string(); 3])
        }

        fn fallback(&self) -> &str {
            "FB"
        }
    }

    #[test]
    fn misaligned_output_is_a_failure() {
        let outcome = tag_sentence(&mut Overlong, &["a", "b"]);
        assert!(matches!(outcome, SentenceOutcome::Failed { reason: Error::LengthMismatch { words: 2, tags: 3 } }));
        assert_eq!(tag_or_fallback(&mut Overlong, 0, &["a", "b"]), (vec!["FB".to_string(); 2], true));
    }

    #[test]
    fn tag_or_fallback_passes_through() {
        let mut tagger = Exploding { len: 0 };
        assert_eq!(tag_or_fallback(&mut tagger, 0, &["a"]), (vec!["X".to_string()], false));
        assert_eq!(tag_or_fallback(&mut tagger, 1, &["boom"]), (vec!["FB".to_string()], true));
    }

    #[test]
    fn empty_sentence_is_a_failure() {
        let model = Model::from_reader("the\tDT\ndog\tNN\n".as_bytes()).unwrap();
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        let input = sentences(&[&[], &["the", "dog"]]);
        let outcomes = tag_sentences(&mut tagger, &input);
        assert!(matches!(outcomes[0], SentenceOutcome::Failed { reason: Error::EmptySentence }));
        assert!(matches!(&outcomes[1], SentenceOutcome::Tagged(tags) if tags == &["DT", "NN"]));
    }

    #[test]
    fn output_is_aligned_with_input() {
        let model = Model::from_reader("the\tDT\ndog\tNN\nbarks\tVBZ\n".as_bytes()).unwrap();
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        let input = sentences(&[&["the", "dog", "barks"], &["unknown", "words"]]);
        let mut out = Vec::new();
        let summary = tag_corpus(&mut tagger, &input, &mut out).unwrap();
        assert_eq!(summary.failures, 0);
        let out = String::from_utf8(out).unwrap();
        let blocks: Vec<&str> = out.split("\n\n").filter(|b| !b.is_empty()).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "the\tDT\ndog\tNN\nbarks\tVBZ");
        assert_eq!(blocks[1].lines().count(), 2);
    }
}
