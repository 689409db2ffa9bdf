//! Viterbi trellis over label ids.
//!
//! All scores are log probabilities. Matrices are stored row-major in flat
//! vectors, `[t][l]` at `num_labels * t + l`.

#![allow(non_snake_case)]

#[derive(Debug, Default)]
pub(crate) struct Context {
    /**
     * The total number of distinct labels (L).
     */
    pub num_labels: usize,

    /**
     * The number of items (T) in the current sequence.
     */
    num_items: usize,

    /**
     * The number of items the buffers can hold without growing.
     */
    cap_items: usize,

    /**
     * Start scores.
     *  This is a [L] vector whose element [l] is log P(l | start).
     */
    pub start: Vec<f64>,

    /**
     * Transition scores.
     *  This is a [L][L] matrix whose element [i][j] is log P(j | i).
     */
    pub trans: Vec<f64>,

    /**
     * State scores.
     *  This is a [T][L] matrix whose element [t][l] is log P(word #t | l).
     */
    pub state: Vec<f64>,

    /**
     * Path scores.
     *  This is a [T][L] matrix whose element [t][l] is the score of the
     *  best path from start arriving at (t, l).
     */
    score: Vec<f64>,

    /**
     * Backward edges.
     *  This is a [T][L] matrix whose element [t][j] is the label #i at t-1
     *  on the best path arriving at (t, j). Row 0 is unused.
     */
    backward_edge: Vec<Option<usize>>,
}

impl Context {
    pub fn new(num_labels: usize) -> Self {
        Self {
            num_labels,
            start: vec![0.0; num_labels],
            trans: vec![0.0; num_labels * num_labels],
            ..Default::default()
        }
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn set_num_items(&mut self, num_items: usize) {
        let L = self.num_labels;
        self.num_items = num_items;
        if self.cap_items < num_items {
            self.state.resize(num_items * L, 0.0);
            self.score.resize(num_items * L, 0.0);
            self.backward_edge.resize(num_items * L, None);
            self.cap_items = num_items;
        }
    }

    /// Finds the best label sequence for the loaded state scores.
    ///
    /// `fallback` replaces a predecessor that cannot be recovered. It is
    /// `None` when the fallback tag is not one of the labels, in which case
    /// the caller renders `None` entries as that tag.
    pub fn viterbi(&mut self, fallback: Option<usize>) -> Vec<Option<usize>> {
        let T = self.num_items;
        let L = self.num_labels;
        if T == 0 {
            return Vec::new();
        }

        /* Compute the scores at (0, *). */
        for j in 0..L {
            self.score[j] = self.start[j] + self.state[j];
            self.backward_edge[j] = None;
        }

        /* Compute the scores at (t, *). */
        for t in 1..T {
            for j in 0..L {
                let mut max_score = f64::NEG_INFINITY;
                let mut argmax = None;
                for i in 0..L {
                    /* Transit from (t-1, i) to (t, j). */
                    let score = self.score[L * (t - 1) + i] + self.trans[L * i + j] + self.state[L * t + j];
                    /* Strict comparison keeps the first label on a tie. */
                    if score > max_score {
                        max_score = score;
                        argmax = Some(i);
                    }
                }
                self.score[L * t + j] = max_score;
                self.backward_edge[L * t + j] = argmax.or(fallback);
            }
        }

        /* Find the label with the best score at the last position. */
        let last = L * (T - 1);
        let mut max_score = f64::NEG_INFINITY;
        let mut best = None;
        for j in 0..L {
            if self.score[last + j] > max_score {
                max_score = self.score[last + j];
                best = Some(j);
            }
        }
        let Some(best) = best else {
            // no path survives
            return vec![fallback; T];
        };

        /* Trace the backward links from the last position. */
        let mut labels = vec![None; T];
        let mut cur = Some(best);
        labels[T - 1] = cur;
        for t in (1..T).rev() {
            cur = match cur {
                Some(j) => self.backward_edge[L * t + j],
                None => fallback,
            };
            labels[t - 1] = cur;
        }
        labels
    }
}
