// Keytracker command line front end
//
// Turns MIDI files into pitch-class sequences, runs them through the
// `keytracker_hmm` cascade, and reports the estimated keys, scored against
// ground truth taken from the file names when present.
//
// Architecture:
// - cli.rs: clap arguments, configuration layering, the top-level `run`
// - batch.rs: File discovery (walkdir) and parallel analysis (rayon)
// - midi.rs: Note-on pitch-class extraction with midly
// - ground_truth.rs: `name_<key>.mid` parsing and exact/relative/wrong verdicts
// - report.rs: Per-file and summary results, text and JSON output
// - error.rs: `CliError`, split into per-file and run-level failures

pub mod batch;
pub mod cli;
pub mod error;
pub mod ground_truth;
pub mod midi;
pub mod report;

pub use cli::{Cli, run};
pub use error::{CliError, Result};
