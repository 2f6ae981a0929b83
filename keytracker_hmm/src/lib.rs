// Keytracker HMM core
//
// Estimates the key (tonic + mode) of a note sequence by treating the key as
// the hidden state of a 24-state Hidden Markov Model and decoding it with the
// Viterbi algorithm, twice: a first pass gives a local key per note, a second
// pass over that key path (no modulation allowed, key distances as emission
// probabilities) collapses it into one global key.
//
// Architecture:
// - key.rs: The 24 canonical keys, index <-> (tonic, mode), names + aliases
// - safelog.rs: log() that maps zero probabilities to negative infinity
// - profiles.rs: Named distance profiles and key profiles (C-relative data)
// - table.rs: `ProbabilityTable` trait the decoder is written against, and
//   `DenseTable` for arbitrary state spaces
// - rotation.rs: Transposes base vectors into transition/emission tables
// - viterbi.rs: Generic log-space Viterbi with first-index tie-breaking
// - pipeline.rs: `KeyModel` and the two-pass cascade
// - config.rs: JSON-loadable configuration, validated once up front
// - error.rs: Error taxonomy (all configuration-time)
//
// Everything is pure: given the same configuration and observations, the
// output is bit-identical.

pub mod config;
pub mod error;
pub mod key;
pub mod pipeline;
pub mod profiles;
pub mod rotation;
pub mod safelog;
pub mod table;
pub mod viterbi;

pub use config::KeyTrackerConfig;
pub use error::{KeyTrackerError, Result};
pub use key::{Key, KeyMode};
pub use pipeline::{KeyEstimate, KeyModel, estimate_key};
pub use profiles::{DistanceProfileName, KeyProfileName};
pub use table::{DenseTable, ProbabilityTable};
