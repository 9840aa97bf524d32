use clap::Parser;
use foldersort::cli::{self, Cli};
use foldersort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::ERROR
        })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli::run(&cli) {
        // Exit code 2: the pass finished but some files stayed behind.
        Ok(outcome) if outcome.has_failures() => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {e:#}"));
            ExitCode::FAILURE
        }
    }
}
