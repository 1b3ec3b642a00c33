//! automerge - merge pull requests once they satisfy a merge policy

mod cli;

use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Args::parse();
    cli::init_tracing(args.verbose);

    match cli::run_automerge(&args).await {
        Ok(report) if report.has_failures() => {
            tracing::error!(
                failed = ?report.failed(),
                "Automerge finished with failures"
            );
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
