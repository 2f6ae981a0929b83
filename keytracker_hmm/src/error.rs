// Error taxonomy for the key tracker core.
//
// Every variant here is raised before a decode begins (bad profile names,
// wrong-length vectors, empty or out-of-range observations) and none of them
// are retried. An observation sequence that no key can explain is NOT an
// error: the decoder reports it as a negative-infinity log-probability. See
// `viterbi.rs` and `KeyEstimate::is_confident()` in `pipeline.rs`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyTrackerError {
    #[error("unknown {kind} profile '{name}' (expected one of: {expected})")]
    UnknownProfile {
        kind: &'static str,
        name: String,
        expected: String,
    },

    #[error("observation sequence is empty")]
    EmptyObservations,

    #[error("{what}: expected {expected} entries, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("observation {index} has symbol {symbol}, but only {limit} symbols are defined")]
    SymbolOutOfRange {
        index: usize,
        symbol: usize,
        limit: usize,
    },

    #[error("{what}[{index}] = {value} is not a finite nonnegative weight")]
    InvalidWeight {
        what: &'static str,
        index: usize,
        value: f64,
    },

    #[error("unrecognised key name '{0}'")]
    InvalidKeyName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl KeyTrackerError {
    /// True for errors caused by the configuration or the caller's input,
    /// as opposed to the environment (filesystem).
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, KeyTrackerError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, KeyTrackerError>;
