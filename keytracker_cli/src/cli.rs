// Command line arguments and the top-level run.
//
// Configuration is layered: built-in defaults, then the `--config` JSON file
// if given, then the `--transitions`/`--profiles` flags. The merged
// `KeyTrackerConfig` is resolved once, before any file is touched, so a bad
// profile name or custom vector fails the run immediately.

use crate::batch::{analyse_files, discover};
use crate::error::Result;
use crate::report::BatchReport;
use clap::Parser;
use keytracker_hmm::{DistanceProfileName, KeyModel, KeyProfileName, KeyTrackerConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// keytracker - estimate the key of MIDI files with a cascaded HMM
///
/// Each file's notes are decoded into a local key per note, then collapsed
/// into one global key. File names ending in `_<key>` (e.g. `ballade_g.mid`)
/// are scored against that key.
#[derive(Parser, Debug)]
#[command(name = "keytracker")]
#[command(version, about)]
pub struct Cli {
    /// MIDI files or directories to analyse (directories are searched
    /// recursively for .mid/.midi files)
    #[arg(required = true, value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Transition profile: linear, exponential, exponential-10,
    /// no-modulation, neighbour-level-count
    #[arg(short, long, value_name = "NAME")]
    pub transitions: Option<DistanceProfileName>,

    /// Key profile: krumhansl-kessler, aarden-essen, sapp, bellman-budge,
    /// temperley (append -raw for the unnormalised published values)
    #[arg(short, long, value_name = "NAME")]
    pub profiles: Option<KeyProfileName>,

    /// JSON configuration file; --transitions and --profiles override it
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also print (and store in the JSON report) the local key path
    #[arg(long)]
    pub local: bool,

    /// Write a JSON report to this path
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Number of worker threads (defaults to one per CPU)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Log filter directive implied by -v/-q.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Defaults, overlaid with the config file, overlaid with flags.
    pub fn key_tracker_config(&self) -> Result<KeyTrackerConfig> {
        let mut config = match &self.config {
            Some(path) => KeyTrackerConfig::load(path)?,
            None => KeyTrackerConfig::default(),
        };
        if let Some(transitions) = self.transitions {
            config.transitions = transitions.to_string();
            config.custom_distance = None;
        }
        if let Some(profiles) = self.profiles {
            config.key_profile = profiles.to_string();
            config.custom_key_profile = None;
        }
        Ok(config)
    }
}

/// Analyse everything `cli` names, print the text report to `out`, write
/// the JSON report if asked, and return the report.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<BatchReport> {
    let config = cli.key_tracker_config()?;
    let resolved = config.resolve()?;
    let model = KeyModel::from_resolved(&resolved);
    info!(
        transitions = %resolved.transition_label,
        key_profile = %resolved.key_profile_label,
        "model ready"
    );

    let files = discover(&cli.inputs)?;
    let reports = match cli.threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(std::io::Error::other)?;
            pool.install(|| analyse_files(&files, &model, cli.local))?
        }
        None => analyse_files(&files, &model, cli.local)?,
    };

    let report = BatchReport::new(
        config,
        resolved.transition_label,
        resolved.key_profile_label,
        reports,
    );
    info!(
        analysed = report.summary.analysed,
        failed = report.summary.failed,
        "batch finished"
    );

    report.write_text(out)?;
    if let Some(path) = &cli.json {
        report.write_json(path)?;
    }
    Ok(report)
}
