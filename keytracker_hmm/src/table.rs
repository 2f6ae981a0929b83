// Probability tables as seen by the decoder.
//
// The Viterbi decoder only ever asks "what is P(column | row)?", so it is
// written against the `ProbabilityTable` trait rather than a concrete type.
// That is what lets the second decoding pass use the key-to-key transition
// table as its emission table: a `TransitionTable` is simply a table whose
// columns happen to be keys.
//
// `DenseTable` is a general row-major table for HMMs that are not the
// 24-key model. It is how callers with their own state space drive
// `viterbi::decode` directly.

use crate::error::{KeyTrackerError, Result};

pub trait ProbabilityTable {
    fn rows(&self) -> usize;
    fn columns(&self) -> usize;

    /// Probability at (row, column). Callers stay within `rows()` x
    /// `columns()`; the decoder checks observations against `columns()`
    /// before it starts.
    fn probability(&self, row: usize, column: usize) -> f64;
}

/// Row-major probability table of arbitrary shape.
///
/// For decoding a model other than the 24-key one with `viterbi::decode`:
///
/// ```
/// use keytracker_hmm::table::DenseTable;
/// use keytracker_hmm::viterbi::decode;
///
/// let trans = DenseTable::from_rows(&[vec![0.9, 0.1], vec![0.1, 0.9]]).unwrap();
/// let emit = DenseTable::from_rows(&[vec![0.9, 0.1], vec![0.1, 0.9]]).unwrap();
/// let path = decode(&[0, 0, 1, 1, 1], &[0.5, 0.5], &trans, &emit).unwrap();
/// assert_eq!(path.states, vec![0, 0, 1, 1, 1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTable {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
}

impl DenseTable {
    /// Build from nested rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * columns);
        for row in rows {
            if row.len() != columns {
                return Err(KeyTrackerError::DimensionMismatch {
                    what: "table row",
                    expected: columns,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(DenseTable {
            rows: rows.len(),
            columns,
            data,
        })
    }
}

impl ProbabilityTable for DenseTable {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn probability(&self, row: usize, column: usize) -> f64 {
        self.data[row * self.columns + column]
    }
}
