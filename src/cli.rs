//! Command-line interface module for foldersort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Asking for a folder when none is given
//! - Building the category table and filters from configuration
//! - Organization and dry-run orchestration
//! - Human-readable or JSON summaries

use crate::config::{Config, Preset};
use crate::file_organizer::{
    FileMove, FileOrganizer, OrganizeOptions, OrganizeReport, Progress,
};
use crate::output::OutputFormatter;
use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Input, theme::ColorfulTheme};
use std::path::{Path, PathBuf};

/// Sort the files of a folder into category subfolders by extension.
#[derive(Parser, Debug)]
#[command(name = "foldersort", version, about)]
pub struct Cli {
    /// Folder to organize. Prompted for when omitted.
    pub path: Option<PathBuf>,

    /// Show what would be moved without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Use the extended category table (videos, audio, archives, code, ...)
    #[arg(short, long)]
    pub extended: bool,

    /// Configuration file (defaults to .foldersortrc.toml, then ~/.config/foldersort/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log each file decision to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Organize files in a directory.
    Organize,
    /// Simulate the operation without making changes.
    DryRun,
}

/// How a run is carried out and reported.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub command: OrganizeCommand,
    pub config_path: Option<PathBuf>,
    pub extended: bool,
    pub json: bool,
    pub show_progress: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            command: OrganizeCommand::Organize,
            config_path: None,
            extended: false,
            json: false,
            show_progress: true,
        }
    }
}

impl From<&Cli> for RunSettings {
    fn from(cli: &Cli) -> Self {
        Self {
            command: if cli.dry_run {
                OrganizeCommand::DryRun
            } else {
                OrganizeCommand::Organize
            },
            config_path: cli.config.clone(),
            extended: cli.extended,
            json: cli.json,
            show_progress: !cli.json,
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Organized(OrganizeReport),
    Planned(Vec<FileMove>),
}

impl RunOutcome {
    /// Returns true if some file could not be moved.
    pub fn has_failures(&self) -> bool {
        match self {
            RunOutcome::Organized(report) => !report.is_complete_success(),
            RunOutcome::Planned(_) => false,
        }
    }
}

/// Runs the parsed command line, prompting for a folder if needed.
pub fn run(cli: &Cli) -> Result<RunOutcome> {
    let target = match &cli.path {
        Some(path) => path.clone(),
        None => prompt_for_folder()?,
    };
    run_cli(&target, &RunSettings::from(cli))
}

/// Runs the CLI application for one folder.
///
/// # Examples
///
/// ```no_run
/// use foldersort::cli::{run_cli, RunSettings};
/// use std::path::Path;
///
/// match run_cli(Path::new("/path/to/directory"), &RunSettings::default()) {
///     Ok(outcome) => println!("Done, failures: {}", outcome.has_failures()),
///     Err(e) => eprintln!("Error: {e:#}"),
/// }
/// ```
pub fn run_cli(dir_path: &Path, settings: &RunSettings) -> Result<RunOutcome> {
    let target = std::path::absolute(dir_path).unwrap_or_else(|_| dir_path.to_path_buf());
    let organizer = build_organizer(settings)?;

    match settings.command {
        OrganizeCommand::Organize => {
            organize_directory(&organizer, &target, settings).map(RunOutcome::Organized)
        }
        OrganizeCommand::DryRun => {
            organize_directory_dry_run(&organizer, &target, settings).map(RunOutcome::Planned)
        }
    }
}

/// Loads configuration and builds an organizer from it.
///
/// The configuration file in use is protected from being moved, along
/// with the running executable.
pub fn build_organizer(settings: &RunSettings) -> Result<FileOrganizer> {
    let mut config =
        Config::load(settings.config_path.as_deref()).context("Error loading configuration")?;
    if settings.extended {
        config.preset = Preset::Extended;
    }

    let table = config
        .category_table()
        .context("Error building category table")?;
    let filters = config
        .compile_filters()
        .context("Error compiling filters")?;

    let mut options = OrganizeOptions::default().with_filters(filters);
    if let Some(source) = &config.source {
        options = options.protect(source);
    }

    Ok(FileOrganizer::new(table, options))
}

fn organize_directory(
    organizer: &FileOrganizer,
    target: &Path,
    settings: &RunSettings,
) -> Result<OrganizeReport> {
    if !settings.json {
        OutputFormatter::info(&format!("Organizing contents of: {}", target.display()));
    }

    let mut progress_bar = None;
    let report = organizer
        .organize_with_progress(target, |event| {
            if !settings.show_progress {
                return;
            }
            match event {
                Progress::Started { total } => {
                    progress_bar = Some(OutputFormatter::create_progress_bar(total as u64));
                }
                Progress::Moved(moved) => {
                    if let Some(pb) = &progress_bar {
                        if moved.renamed {
                            pb.println(format!(
                                "   Renamed {} to {} (duplicate found)",
                                display_name(&moved.source),
                                display_name(&moved.destination)
                            ));
                        }
                        pb.set_message(display_name(&moved.source));
                        pb.inc(1);
                    }
                }
                Progress::Failed(_) => {
                    if let Some(pb) = &progress_bar {
                        pb.inc(1);
                    }
                }
            }
        })
        .with_context(|| format!("Cannot organize {}", target.display()))?;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    if settings.json {
        println!("{}", to_json(&report)?);
    } else {
        OutputFormatter::report(&report);
    }

    Ok(report)
}

fn organize_directory_dry_run(
    organizer: &FileOrganizer,
    target: &Path,
    settings: &RunSettings,
) -> Result<Vec<FileMove>> {
    let planned = organizer
        .plan(target)
        .with_context(|| format!("Cannot analyze {}", target.display()))?;

    if settings.json {
        println!("{}", to_json(&planned)?);
    } else {
        OutputFormatter::dry_run_notice(&format!(
            "Analyzing contents of: {}",
            target.display()
        ));
        OutputFormatter::plan(&planned);
        OutputFormatter::plain(&format!(
            "Run 'foldersort {}' (without --dry-run) to execute the organization.",
            target.display()
        ));
    }

    Ok(planned)
}

/// Asks the user which folder to organize.
pub fn prompt_for_folder() -> Result<PathBuf> {
    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Folder to organize")
        .interact_text()
        .context("No folder selected")?;
    let trimmed = answer.trim();
    anyhow::ensure!(!trimmed.is_empty(), "No folder selected");
    Ok(PathBuf::from(trimmed))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
