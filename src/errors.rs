//! Error type shared by the trainer, the decoder and the I/O adapters.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The decoder was handed a sentence without words.
    #[error("cannot decode an empty sentence")]
    EmptySentence,

    /// A decoder returned a tag sequence that does not line up with its input.
    #[error("decoded {tags} tags for {words} words")]
    LengthMismatch { words: usize, tags: usize },

    /// The model knows no tags, so there is no hidden state to decode into.
    #[error("tag vocabulary is empty")]
    EmptyVocabulary,

    /// A previous tag with no outgoing transition counts.
    #[error("no outgoing transitions counted for tag {0:?}")]
    EmptyDistribution(String),

    /// An emission row whose tag has no positive occurrence total.
    #[error("no occurrence count for tag {0:?}")]
    MissingTagCount(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
