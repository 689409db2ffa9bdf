#![allow(non_snake_case)]

use super::{context::Context, model::Model, safe_log, table::Row, START_TAG};
use crate::{
    config::DecoderConfig,
    errors::{Error, Result},
    quark::{Quark, StringTable},
};

pub trait Tagger {
    /// Loads a sentence. Fails on an empty sentence.
    fn set_sequence<S: AsRef<str>>(&mut self, words: &[S]) -> Result<()>;

    /// Number of words currently loaded.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most probable tag sequence for the loaded sentence, one tag per word.
    fn viterbi(&mut self) -> Result<Vec<String>>;

    /// Tag emitted wherever no tag can be recovered.
    fn fallback(&self) -> &str;

    fn tag<S: AsRef<str>>(&mut self, words: &[S]) -> Result<Vec<String>> {
        self.set_sequence(words)?;
        self.viterbi()
    }
}

#[derive(Debug, PartialEq)]
enum Level {
    None,
    Set,
}

/// Viterbi decoder over a borrowed [`Model`].
///
/// Transition and start scores are computed once at construction; only the
/// emission scores change from one sentence to the next.
#[derive(Debug)]
pub struct HmmTagger<'a> {
    labels: &'a Quark,
    emissions: Vec<Option<&'a Row<f64>>>,
    ctx: Context,
    log_floor: f64,
    fallback: String,
    fallback_id: Option<usize>,
    level: Level,
}

impl<'a> HmmTagger<'a> {
    pub fn new(model: &'a Model, config: &DecoderConfig) -> Result<Self> {
        config.validate()?;
        let labels = model.vocabulary();
        let L = labels.len();
        if L == 0 {
            return Err(Error::EmptyVocabulary);
        }
        let fallback = match &config.fallback {
            Some(tag) => tag.clone(),
            None => model.most_frequent_tag().ok_or(Error::EmptyVocabulary)?.to_string(),
        };
        let floor = config.floor;
        log::debug!("decoder (tags: {L}, floor: {floor:e}, fallback: {fallback})");

        let mut ctx = Context::new(L);
        for (j, curr) in labels.iter().enumerate() {
            ctx.start[j] = safe_log(model.transition(START_TAG, curr).unwrap_or(floor));
        }
        /* Transition scores between two labels. */
        for (i, prev) in labels.iter().enumerate() {
            for (j, curr) in labels.iter().enumerate() {
                ctx.trans[L * i + j] = safe_log(model.transition(prev, curr).unwrap_or(floor));
            }
        }

        Ok(Self {
            labels,
            emissions: labels.iter().map(|tag| model.emission_row(tag)).collect(),
            ctx,
            log_floor: safe_log(floor),
            fallback_id: labels.to_id(&fallback),
            fallback,
            level: Level::None,
        })
    }

    fn label(&self, id: Option<usize>) -> String {
        id.and_then(|id| self.labels.to_str(id)).unwrap_or(self.fallback.as_str()).to_string()
    }
}

impl<'a> Tagger for HmmTagger<'a> {
    fn set_sequence<S: AsRef<str>>(&mut self, words: &[S]) -> Result<()> {
        if words.is_empty() {
            self.level = Level::None;
            return Err(Error::EmptySentence);
        }
        let L = self.ctx.num_labels;
        self.ctx.set_num_items(words.len());
        for (t, word) in words.iter().enumerate() {
            let word = word.as_ref();
            for (j, row) in self.emissions.iter().enumerate() {
                self.ctx.state[L * t + j] = match row.and_then(|r| r.get(word)) {
                    Some(&p) => safe_log(p),
                    None => self.log_floor,
                };
            }
        }
        self.level = Level::Set;
        Ok(())
    }

    fn len(&self) -> usize {
        match self.level {
            Level::None => 0,
            Level::Set => self.ctx.num_items(),
        }
    }

    fn viterbi(&mut self) -> Result<Vec<String>> {
        if self.level != Level::Set {
            return Err(Error::EmptySentence);
        }
        let path = self.ctx.viterbi(self.fallback_id);
        Ok(path.into_iter().map(|id| self.label(id)).collect())
    }

    fn fallback(&self) -> &str {
        &self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "the\tDT\ndog\tNN\nbarks\tVBZ\n\n\
                          a\tDT\ncat\tNN\nsleeps\tVBZ\n\n\
                          the\tDT\ncats\tNNS\nsleep\tVBP\n\n\
                          dogs\tNNS\nbark\tVBP\n\n";

    fn model(corpus: &str) -> Model {
        Model::from_reader(corpus.as_bytes()).unwrap()
    }

    #[test]
    fn tags_training_sentence() {
        let model = model("the\tDT\ndog\tNN\nbarks\tVBZ\n");
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        assert_eq!(tagger.tag(&["the", "dog", "barks"]).unwrap(), vec!["DT", "NN", "VBZ"]);
        assert_eq!(tagger.len(), 3);
    }

    #[test]
    fn tags_unseen_combination() {
        let model = model(CORPUS);
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        assert_eq!(tagger.tag(&["a", "dog", "sleeps"]).unwrap(), vec!["DT", "NN", "VBZ"]);
        assert_eq!(tagger.tag(&["the", "dogs", "bark"]).unwrap(), vec!["DT", "NNS", "VBP"]);
        assert_eq!(tagger.tag(&["cats"]).unwrap(), vec!["NNS"]);
    }

    #[test]
    fn unseen_words_get_full_length_output() {
        let model = model(CORPUS);
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        let words = ["the", "zebra", "quietly", "grazes"];
        let tags = tagger.tag(&words).unwrap();
        assert_eq!(tags.len(), words.len());
        assert_eq!(tags[0], "DT");
        assert!(tags.iter().all(|t| model.vocabulary().contains(t)));
    }

    #[test]
    fn single_tag_vocabulary() {
        let model = model("dog\tNN\ncat\tNN\n");
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        assert_eq!(tagger.tag(&["xyzzy", "plugh", "quux"]).unwrap(), vec!["NN"; 3]);
    }

    #[test]
    fn deterministic() {
        let model = model(CORPUS);
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        let words = ["dogs", "sleep", "the", "unknown"];
        let first = tagger.tag(&words).unwrap();
        tagger.tag(&["a", "cat"]).unwrap();
        assert_eq!(tagger.tag(&words).unwrap(), first);
        let mut other = model.tagger(&DecoderConfig::default()).unwrap();
        assert_eq!(other.tag(&words).unwrap(), first);
    }

    #[test]
    fn first_seen_tag_wins_ties() {
        let model = model("x\tA\n\nx\tB\n\n");
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        assert_eq!(tagger.tag(&["x", "x"]).unwrap(), vec!["A", "A"]);
    }

    #[test]
    fn blank_lines_weigh_on_start_transitions() {
        // two blank lines count start -> end twice, so P(B | start) = 1/3
        let model = model("\nz\tB\nz\tA\ny\tB\n\n\n");
        assert_eq!(model.transition("start", "end"), Some(2.0 / 3.0));
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        assert_eq!(tagger.tag(&["x", "y"]).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn unterminated_last_sentence_has_no_end_transition() {
        let model = model("y\tB\nx\tA\nx\tA\n\nx\tA\n\nx\tB\ny\tB\ny\tB\n\nx\tB\nx\tB\n");
        assert_eq!(model.transition("B", "B"), Some(0.6));
        assert_eq!(model.transition("B", "end"), Some(0.2));
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        assert_eq!(tagger.tag(&["x", "x", "x"]).unwrap(), vec!["B", "B", "B"]);
    }

    #[test]
    fn fallback_defaults_to_most_frequent_tag() {
        let model = model(CORPUS);
        let tagger = model.tagger(&DecoderConfig::default()).unwrap();
        assert_eq!(tagger.fallback(), "DT");
        let tagger = model.tagger(&DecoderConfig::default().with_fallback("X")).unwrap();
        assert_eq!(tagger.fallback(), "X");
    }

    #[test]
    fn floor_is_configurable() {
        // with a floor above every trained probability, unseen events dominate
        let model = model(CORPUS);
        let config = DecoderConfig::default().with_floor(1.0);
        let mut tagger = model.tagger(&config).unwrap();
        let tags = tagger.tag(&["the", "dog"]).unwrap();
        assert_eq!(tags.len(), 2);
        assert!(matches!(
            model.tagger(&DecoderConfig::default().with_floor(0.0)),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_sentence_is_rejected() {
        let model = model(CORPUS);
        let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
        let words: [&str; 0] = [];
        assert!(matches!(tagger.tag(&words), Err(Error::EmptySentence)));
        assert!(matches!(tagger.viterbi(), Err(Error::EmptySentence)));
        assert!(tagger.is_empty());
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        let model = model("\n\nnot a token\n");
        assert!(matches!(model.tagger(&DecoderConfig::default()), Err(Error::EmptyVocabulary)));
        let config = DecoderConfig::default().with_fallback("NN");
        assert!(matches!(model.tagger(&config), Err(Error::EmptyVocabulary)));
    }
}
