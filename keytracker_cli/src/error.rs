// Error types for the keytracker command line front end.
//
// Two classes of failure:
// - Per-file (unreadable or malformed MIDI, a file with no notes): the batch
//   logs a warning, records the file as failed, and moves on.
// - Run-level (bad configuration, missing input, report cannot be written):
//   the run stops before or after the batch, never midway.

use keytracker_hmm::KeyTrackerError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Model(#[from] KeyTrackerError),

    #[error("failed to parse MIDI file '{path}': {reason}")]
    Midi { path: PathBuf, reason: String },

    #[error("input path does not exist: '{0}'")]
    NoInput(PathBuf),

    #[error("no note-on events in '{0}'")]
    NoNotes(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// True when the error concerns one input file and the batch can go on
    /// without it.
    pub fn is_per_file(&self) -> bool {
        matches!(self, CliError::Midi { .. } | CliError::NoNotes(_))
    }

    pub fn midi(path: &Path, reason: impl ToString) -> Self {
        CliError::Midi {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
