// Log-space Viterbi decoding with deterministic tie-breaking.
//
// Generic over the number of states and over any `ProbabilityTable`: the
// state count is the length of the start vector, states are identified by
// index, and "canonical order" is index order. Probabilities are converted
// with `safelog`, so zero entries prune paths instead of failing.
//
// Ties are resolved toward the lowest state index, both when choosing a
// predecessor and when choosing the final state. The maximum is computed
// once per lattice cell and candidates are compared against it with exact
// float equality; identical inputs always give bit-identical paths.
//
// A final log-probability of negative infinity is a normal result: no state
// sequence explains the observations under the given tables. In that case
// every tie resolves to state 0.
//
// The lattice lives only for the duration of one `decode` call.

use crate::error::{KeyTrackerError, Result};
use crate::safelog::safelog;
use crate::table::ProbabilityTable;

/// Most probable state sequence and its log-probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiPath {
    pub states: Vec<usize>,
    pub log_prob: f64,
}

/// Decode `observations` (column indices into `emissions`).
///
/// `start` holds the initial probability of each state and fixes the
/// state count `n`; `transitions` must be `n x n` and `emissions` must have
/// `n` rows.
pub fn decode<T, E>(
    observations: &[usize],
    start: &[f64],
    transitions: &T,
    emissions: &E,
) -> Result<ViterbiPath>
where
    T: ProbabilityTable + ?Sized,
    E: ProbabilityTable + ?Sized,
{
    let n = start.len();
    check_dimensions(observations, n, transitions, emissions)?;

    let trans_logs: Vec<f64> = (0..n * n)
        .map(|k| safelog(transitions.probability(k / n, k % n)))
        .collect();
    let log_trans = |from: usize, to: usize| trans_logs[from * n + to];
    let log_emit = |state: usize, symbol: usize| safelog(emissions.probability(state, symbol));

    let steps = observations.len();
    let mut lattice = Lattice::new(steps, n);

    for (s, &p) in start.iter().enumerate() {
        lattice.score[s] = safelog(p) + log_emit(s, observations[0]);
    }

    let mut candidates = vec![0.0; n];
    for (t, &symbol) in observations.iter().enumerate().skip(1) {
        for s in 0..n {
            for (s0, c) in candidates.iter_mut().enumerate() {
                *c = lattice.score_at(t - 1, s0) + log_trans(s0, s);
            }
            let (best, prev) = first_max(&candidates);
            lattice.set(t, s, best + log_emit(s, symbol), prev);
        }
    }

    let (log_prob, last) = first_max(lattice.row(steps - 1));
    let mut states = vec![0; steps];
    states[steps - 1] = last;
    for t in (1..steps).rev() {
        states[t - 1] = lattice.back_at(t, states[t]);
    }

    Ok(ViterbiPath { states, log_prob })
}

/// Maximum of `values` and the lowest index holding exactly that value.
fn first_max(values: &[f64]) -> (f64, usize) {
    let best = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let index = values.iter().position(|&v| v == best).unwrap_or(0);
    (best, index)
}

fn check_dimensions<T, E>(
    observations: &[usize],
    n: usize,
    transitions: &T,
    emissions: &E,
) -> Result<()>
where
    T: ProbabilityTable + ?Sized,
    E: ProbabilityTable + ?Sized,
{
    if observations.is_empty() {
        return Err(KeyTrackerError::EmptyObservations);
    }
    if n == 0 {
        return Err(KeyTrackerError::DimensionMismatch {
            what: "start probabilities",
            expected: transitions.rows(),
            actual: 0,
        });
    }
    for (what, actual) in [
        ("transition rows", transitions.rows()),
        ("transition columns", transitions.columns()),
        ("emission rows", emissions.rows()),
    ] {
        if actual != n {
            return Err(KeyTrackerError::DimensionMismatch {
                what,
                expected: n,
                actual,
            });
        }
    }
    let limit = emissions.columns();
    if let Some((index, &symbol)) = observations.iter().enumerate().find(|&(_, &o)| o >= limit) {
        return Err(KeyTrackerError::SymbolOutOfRange {
            index,
            symbol,
            limit,
        });
    }
    Ok(())
}

/// Per-call dynamic programming table: best score reaching each
/// (time, state) and the predecessor achieving it.
struct Lattice {
    states: usize,
    score: Vec<f64>,
    back: Vec<usize>,
}

impl Lattice {
    fn new(steps: usize, states: usize) -> Self {
        Lattice {
            states,
            score: vec![f64::NEG_INFINITY; steps * states],
            back: vec![0; steps * states],
        }
    }

    fn score_at(&self, t: usize, s: usize) -> f64 {
        self.score[t * self.states + s]
    }

    fn back_at(&self, t: usize, s: usize) -> usize {
        self.back[t * self.states + s]
    }

    fn row(&self, t: usize) -> &[f64] {
        &self.score[t * self.states..(t + 1) * self.states]
    }

    fn set(&mut self, t: usize, s: usize, score: f64, prev: usize) {
        let k = t * self.states + s;
        self.score[k] = score;
        self.back[k] = prev;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DenseTable;

    /// The classic two-state weather model: hidden Rainy/Sunny, observed
    /// walk/shop/clean.
    fn weather() -> (Vec<f64>, DenseTable, DenseTable) {
        let start = vec![0.6, 0.4];
        let trans = DenseTable::from_rows(&[vec![0.7, 0.3], vec![0.4, 0.6]]).unwrap();
        let emit = DenseTable::from_rows(&[vec![0.1, 0.4, 0.5], vec![0.6, 0.3, 0.1]]).unwrap();
        (start, trans, emit)
    }

    const RAINY: usize = 0;
    const SUNNY: usize = 1;
    const WALK: usize = 0;
    const SHOP: usize = 1;
    const CLEAN: usize = 2;

    #[test]
    fn test_weather_model() {
        let (start, trans, emit) = weather();
        let path = decode(&[WALK, SHOP, CLEAN], &start, &trans, &emit).unwrap();
        assert_eq!(path.states, vec![SUNNY, RAINY, RAINY]);
        // 0.4*0.6 * 0.4*0.4 * 0.7*0.5 = 0.01344
        assert!((path.log_prob - 0.01344f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_single_observation_is_argmax() {
        let (start, trans, emit) = weather();
        let path = decode(&[WALK], &start, &trans, &emit).unwrap();
        assert_eq!(path.states, vec![SUNNY]); // 0.4*0.6 > 0.6*0.1
        let path = decode(&[CLEAN], &start, &trans, &emit).unwrap();
        assert_eq!(path.states, vec![RAINY]);
    }

    #[test]
    fn test_single_observation_tie_goes_to_first_state() {
        let start = vec![0.25; 4];
        let trans = DenseTable::from_rows(&vec![vec![0.25; 4]; 4]).unwrap();
        let emit = DenseTable::from_rows(&[
            vec![0.1, 0.9],
            vec![0.5, 0.5],
            vec![0.5, 0.5],
            vec![0.2, 0.8],
        ])
        .unwrap();
        let path = decode(&[0], &start, &trans, &emit).unwrap();
        assert_eq!(path.states, vec![1]);
    }

    #[test]
    fn test_predecessor_tie_goes_to_first_state() {
        // Both states score identically at t=0 and transition uniformly, so
        // every predecessor is a tie.
        let start = vec![0.5, 0.5];
        let trans = DenseTable::from_rows(&[vec![0.5, 0.5], vec![0.5, 0.5]]).unwrap();
        let emit = DenseTable::from_rows(&[vec![0.5, 0.1], vec![0.5, 0.9]]).unwrap();
        let path = decode(&[0, 1], &start, &trans, &emit).unwrap();
        assert_eq!(path.states, vec![0, 1]);
    }

    #[test]
    fn test_deterministic() {
        let (start, trans, emit) = weather();
        let obs: Vec<usize> = (0..200).map(|i| (i * 7 + i / 3) % 3).collect();
        let a = decode(&obs, &start, &trans, &emit).unwrap();
        let b = decode(&obs, &start, &trans, &emit).unwrap();
        assert_eq!(a.states, b.states);
        assert_eq!(a.log_prob.to_bits(), b.log_prob.to_bits());
    }

    #[test]
    fn test_impossible_sequence_is_negative_infinity() {
        let start = vec![0.5, 0.5];
        let trans = DenseTable::from_rows(&[vec![0.9, 0.1], vec![0.1, 0.9]]).unwrap();
        let emit = DenseTable::from_rows(&[vec![1.0, 0.0], vec![1.0, 0.0]]).unwrap();
        let path = decode(&[0, 1, 0], &start, &trans, &emit).unwrap();
        assert_eq!(path.log_prob, f64::NEG_INFINITY);
        assert_eq!(path.states.len(), 3);
    }

    #[test]
    fn test_zero_transition_prunes_path() {
        // State 1 emits symbol 1 strongly, but state 0 can never leave.
        let start = vec![1.0, 0.0];
        let trans = DenseTable::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let emit = DenseTable::from_rows(&[vec![0.9, 0.1], vec![0.1, 0.9]]).unwrap();
        let path = decode(&[0, 1, 1], &start, &trans, &emit).unwrap();
        assert_eq!(path.states, vec![0, 0, 0]);
        assert!(path.log_prob.is_finite());
    }

    #[test]
    fn test_dimension_checks() {
        let (start, trans, emit) = weather();
        assert!(matches!(
            decode(&[], &start, &trans, &emit),
            Err(KeyTrackerError::EmptyObservations)
        ));
        assert!(matches!(
            decode(&[WALK, 3], &start, &trans, &emit),
            Err(KeyTrackerError::SymbolOutOfRange {
                index: 1,
                symbol: 3,
                limit: 3
            })
        ));
        assert!(matches!(
            decode(&[WALK], &[0.2, 0.3, 0.5], &trans, &emit),
            Err(KeyTrackerError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            decode(&[WALK], &[], &trans, &emit),
            Err(KeyTrackerError::DimensionMismatch { .. })
        ));
    }
}
