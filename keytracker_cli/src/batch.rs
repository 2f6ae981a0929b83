// Discovery and parallel analysis of MIDI files.
//
// Inputs are files or directories. Directories are walked recursively and
// every `.mid`/`.midi` file (extension case-insensitive) is collected; an
// explicitly named file is taken as-is whatever its extension. The result is
// sorted and deduplicated so reports come out in a stable order.
//
// Analysis runs on the rayon pool, one file per task, all sharing one
// immutable `KeyModel`. Output order matches input order.

use crate::error::{CliError, Result};
use crate::ground_truth::{ground_truth_from_path, judge};
use crate::midi::read_pitch_classes;
use crate::report::{FileAnalysis, FileReport};
use keytracker_hmm::KeyModel;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File extensions treated as Standard MIDI Files during directory scans.
pub const MIDI_EXTENSIONS: [&str; 2] = ["mid", "midi"];

pub fn is_midi_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MIDI_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
}

/// Collect the MIDI files named by `inputs`.
pub fn discover(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.exists() {
            return Err(CliError::NoInput(input.clone()));
        }
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable directory entry: {e}");
                    continue;
                }
            };
            if entry.file_type().is_file() && is_midi_path(entry.path()) {
                debug!("discovered {}", entry.path().display());
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();

    info!("discovered {} MIDI files", files.len());
    if files.is_empty() {
        warn!("no MIDI files found");
    }
    Ok(files)
}

/// Analyse every file in parallel. Per-file failures become failed entries
/// in the result; any other error aborts the batch.
pub fn analyse_files(
    files: &[PathBuf],
    model: &KeyModel,
    keep_local_path: bool,
) -> Result<Vec<FileReport>> {
    files
        .par_iter()
        .map(|path| match analyse_file(path, model, keep_local_path) {
            Ok(analysis) => Ok(FileReport::analysed(path.clone(), analysis)),
            Err(e) if e.is_per_file() => {
                warn!("{e}");
                Ok(FileReport::failed(path.clone(), e.to_string()))
            }
            Err(e) => Err(e),
        })
        .collect()
}

/// Extract, estimate and score a single file.
pub fn analyse_file(path: &Path, model: &KeyModel, keep_local_path: bool) -> Result<FileAnalysis> {
    let pitch_classes = read_pitch_classes(path)?;
    let estimate = model.estimate(&pitch_classes)?;
    if !estimate.is_confident() {
        warn!(
            "{}: no key explains the notes, estimate is arbitrary",
            path.display()
        );
    }

    let ground_truth = ground_truth_from_path(path);
    let verdict = ground_truth.map(|truth| judge(estimate.global_key, truth));
    debug!(
        path = %path.display(),
        key = %estimate.global_key,
        ?verdict,
        "analysed"
    );

    Ok(FileAnalysis {
        notes: pitch_classes.len(),
        global_key: estimate.global_key,
        global_log_prob: estimate.global_log_prob,
        local_log_prob: estimate.local_log_prob,
        local_modulations: estimate.local_modulations(),
        confident: estimate.is_confident(),
        local_path: keep_local_path.then_some(estimate.local_path),
        ground_truth,
        verdict,
    })
}
