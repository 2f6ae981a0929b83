// Per-file results, batch summary, and their two renderings: a plain-text
// listing for the terminal and a JSON `BatchReport` for downstream tooling.
//
// Log-probabilities of negative infinity serialise as JSON `null`
// (serde_json's treatment of non-finite floats).

use crate::error::{CliError, Result};
use crate::ground_truth::Verdict;
use keytracker_hmm::{Key, KeyTrackerConfig};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Bumped whenever a field of the JSON report changes meaning or goes away.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<FileAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn analysed(path: PathBuf, analysis: FileAnalysis) -> Self {
        FileReport {
            path,
            analysis: Some(analysis),
            error: None,
        }
    }

    pub fn failed(path: PathBuf, error: String) -> Self {
        FileReport {
            path,
            analysis: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileAnalysis {
    pub notes: usize,
    pub global_key: Key,
    pub global_log_prob: f64,
    pub local_log_prob: f64,
    pub local_modulations: usize,
    /// Only kept when the local path was asked for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<Vec<Key>>,
    pub confident: bool,
    pub ground_truth: Option<Key>,
    pub verdict: Option<Verdict>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub files: usize,
    pub analysed: usize,
    pub failed: usize,
    /// Analysed files where no key could explain the notes.
    pub unconfident: usize,
    pub with_ground_truth: usize,
    pub exact: usize,
    pub relative: usize,
    /// `None` when no analysed file carries a ground truth.
    pub exact_accuracy: Option<f64>,
    /// Accuracy counting relative-key answers as correct.
    pub lenient_accuracy: Option<f64>,
}

impl BatchSummary {
    pub fn from_files(files: &[FileReport]) -> Self {
        let mut summary = BatchSummary {
            files: files.len(),
            ..Default::default()
        };
        for analysis in files.iter().filter_map(|f| f.analysis.as_ref()) {
            summary.analysed += 1;
            if !analysis.confident {
                summary.unconfident += 1;
            }
            match analysis.verdict {
                Some(Verdict::Exact) => summary.exact += 1,
                Some(Verdict::Relative) => summary.relative += 1,
                Some(Verdict::Wrong) | None => {}
            }
            if analysis.verdict.is_some() {
                summary.with_ground_truth += 1;
            }
        }
        summary.failed = summary.files - summary.analysed;
        if summary.with_ground_truth > 0 {
            let total = summary.with_ground_truth as f64;
            summary.exact_accuracy = Some(summary.exact as f64 / total);
            summary.lenient_accuracy = Some((summary.exact + summary.relative) as f64 / total);
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub schema_version: u32,
    pub generator_version: String,
    /// Labels of the profiles actually used ("custom" for custom vectors).
    pub transitions: String,
    pub key_profile: String,
    pub config: KeyTrackerConfig,
    pub files: Vec<FileReport>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn new(
        config: KeyTrackerConfig,
        transitions: String,
        key_profile: String,
        files: Vec<FileReport>,
    ) -> Self {
        let summary = BatchSummary::from_files(&files);
        BatchReport {
            schema_version: SCHEMA_VERSION,
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            transitions,
            key_profile,
            config,
            files,
            summary,
        }
    }

    /// Write the report as pretty JSON. The file is written under a
    /// temporary name and renamed into place, so a failed write never
    /// leaves a truncated report behind.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let temp_path = path.with_extension("json.tmp");
        let written = self
            .write_pretty(&temp_path)
            .and_then(|()| std::fs::rename(&temp_path, path).map_err(CliError::from));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }
        info!(path = %path.display(), files = self.files.len(), "wrote JSON report");
        Ok(())
    }

    fn write_pretty(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Plain-text listing: one line per file, the local path underneath
    /// when it was kept, then the summary.
    pub fn write_text(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(
            out,
            "transitions: {}, key profile: {}",
            self.transitions, self.key_profile
        )?;
        for file in &self.files {
            let path = file.path.display();
            match (&file.analysis, &file.error) {
                (Some(a), _) => {
                    write!(
                        out,
                        "{path}: {} (log p = {})",
                        a.global_key,
                        format_log_prob(a.global_log_prob)
                    )?;
                    if let (Some(truth), Some(verdict)) = (a.ground_truth, a.verdict) {
                        write!(out, ", expected {truth}: {}", verdict_label(verdict))?;
                    }
                    if !a.confident {
                        write!(out, " [no key explains these notes]")?;
                    }
                    writeln!(out)?;
                    if let Some(local) = &a.local_path {
                        let names: Vec<&str> = local.iter().map(|k| k.name()).collect();
                        writeln!(
                            out,
                            "    local ({} modulations): {}",
                            a.local_modulations,
                            names.join(" ")
                        )?;
                    }
                }
                (None, error) => {
                    let reason = error.as_deref().unwrap_or("unknown error");
                    writeln!(out, "{path}: FAILED ({reason})")?;
                }
            }
        }

        let s = &self.summary;
        writeln!(out)?;
        writeln!(
            out,
            "Summary: {} analysed, {} failed (of {} files)",
            s.analysed, s.failed, s.files
        )?;
        if let (Some(exact), Some(lenient)) = (s.exact_accuracy, s.lenient_accuracy) {
            writeln!(
                out,
                "Accuracy over {} annotated files: {:.1}% exact, {:.1}% counting relative keys",
                s.with_ground_truth,
                exact * 100.0,
                lenient * 100.0
            )?;
        }
        Ok(())
    }
}

fn format_log_prob(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.3}")
    } else {
        "-inf".to_string()
    }
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Exact => "exact",
        Verdict::Relative => "relative key",
        Verdict::Wrong => "wrong",
    }
}
