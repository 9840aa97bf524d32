//! foldersort - sort a folder's files into category subfolders
//!
//! This library classifies files by extension, moves them under
//! `Organized_Files/<Category>/` inside the folder being organized, renames
//! on name clashes instead of overwriting, and reports what happened. The
//! category table and file filters can be extended with a TOML
//! configuration file.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;

pub use config::{CompiledFilters, Config, ConfigError, Preset};
pub use file_category::{Category, CategoryTable, FALLBACK_CATEGORY};
pub use file_organizer::{
    FileEntry, FileFailure, FileMove, FileOrganizer, MoveError, ORGANIZED_DIR_NAME,
    OrganizeError, OrganizeOptions, OrganizeReport, Progress, organize,
};

pub use cli::{OrganizeCommand, RunOutcome, RunSettings, run_cli};
