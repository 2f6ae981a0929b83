// keytracker binary entry point.
//
// Exit codes: 0 when every file was analysed, 1 when some files failed,
// 2 when the run could not start or its report could not be written.

use clap::Parser;
use keytracker_cli::{Cli, run};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let stdout = std::io::stdout();
    match run(&cli, &mut stdout.lock()) {
        Ok(report) if report.summary.failed > 0 => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

/// RUST_LOG wins over -v/-q when set.
fn init_logging(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
