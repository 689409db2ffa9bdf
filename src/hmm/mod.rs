//! First-order hidden Markov model: counting, estimation and Viterbi decoding.

mod context;
pub mod counter;
pub mod estimator;
pub mod model;
pub mod table;
pub mod tagger;

pub use counter::{Counter, Counts, Record};
pub use model::Model;
pub use tagger::{HmmTagger, Tagger};

/// Virtual predecessor of the first tag of every sentence.
pub const START_TAG: &str = "start";
/// Virtual successor of the last tag of every sentence. Only ever counted.
pub const END_TAG: &str = "end";

/// Natural logarithm, with `-inf` for anything not strictly positive.
#[inline]
pub fn safe_log(x: f64) -> f64 {
    if x > 0.0 {
        x.ln()
    } else {
        f64::NEG_INFINITY
    }
}
