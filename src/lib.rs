//! Part-of-speech tagging with a first-order hidden Markov model.
//!
//! ```
//! use hmmtagger::{DecoderConfig, Model, Tagger};
//!
//! let corpus = "the\tDT\ndog\tNN\nbarks\tVBZ\n\n";
//! let model = Model::from_reader(corpus.as_bytes()).unwrap();
//! let mut tagger = model.tagger(&DecoderConfig::default()).unwrap();
//! assert_eq!(tagger.tag(&["the", "dog", "barks"]).unwrap(), ["DT", "NN", "VBZ"]);
//! ```

pub mod config;
pub mod dataset;
pub mod errors;
pub mod evaluation;
pub mod hmm;
pub mod pipeline;
pub mod quark;

pub use config::DecoderConfig;
pub use dataset::{read_sentences, write_tagged, Dataset, TaggedSentence};
pub use errors::{Error, Result};
pub use evaluation::{Estimation, Evaluation};
pub use hmm::{Counter, Counts, HmmTagger, Model, Record, Tagger};
pub use pipeline::{tag_corpus, tag_sentences, SentenceOutcome, TaggingSummary};
