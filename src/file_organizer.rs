/// File organization: moving a folder's files into category subfolders.
///
/// An organize pass lists the immediate files of a target folder, classifies
/// each one by extension and moves it under
/// `<target>/Organized_Files/<Category>/`. Name clashes at the destination are
/// resolved by appending `(n)` before the extension; nothing is ever
/// overwritten. A failure on one file is recorded and the pass continues.
use crate::config::CompiledFilters;
use crate::file_category::{CategoryTable, extension_of};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the folder created inside the target to hold category folders.
pub const ORGANIZED_DIR_NAME: &str = "Organized_Files";

/// Fatal errors: the target folder cannot be organized at all.
///
/// These are raised before anything on disk is touched.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Folder does not exist: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("Path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },
    #[error("Cannot read folder {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
}

/// Errors that can occur while moving a single file.
#[derive(Debug, Error)]
pub enum MoveError {
    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to claim a destination name.
    #[error("Failed to reserve destination in {}: {source}", dir.display())]
    ReservationFailed { dir: PathBuf, source: io::Error },
    /// Failed to move a file to its category directory.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// The source path does not end in a file name.
    #[error("{} has no file name component", path.display())]
    NoFileName { path: PathBuf },
}

/// One candidate file found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path of the file inside the target folder.
    pub path: PathBuf,
    /// Base name, lossily converted for display.
    pub name: String,
    /// Lowercase extension including the dot, or empty.
    pub extension: String,
}

impl FileEntry {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = extension_of(&path);
        Self {
            path,
            name,
            extension,
        }
    }
}

/// Why a file in the target folder was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The organizer's own executable or configuration.
    Protected,
    /// Rejected by the configured filter rules.
    Filtered,
    /// A symbolic link; links are never followed or moved.
    Symlink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    #[serde(serialize_with = "lossy_path")]
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// The files a pass will work on, sorted by name, and the ones it won't.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub files: Vec<FileEntry>,
    pub skipped: Vec<SkippedFile>,
}

/// A file relocation, either performed or planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMove {
    #[serde(serialize_with = "lossy_path")]
    pub source: PathBuf,
    #[serde(serialize_with = "lossy_path")]
    pub destination: PathBuf,
    pub category: String,
    /// True when the destination name differs from the source name.
    pub renamed: bool,
}

/// A file that could not be moved, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    #[serde(serialize_with = "lossy_path")]
    pub path: PathBuf,
    pub message: String,
}

/// Summary of one organize pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizeReport {
    /// The folder that was organized.
    #[serde(serialize_with = "lossy_path")]
    pub target: PathBuf,
    /// `<target>/Organized_Files`. May not exist if nothing was moved.
    #[serde(serialize_with = "lossy_path")]
    pub organized_root: PathBuf,
    /// Number of files the pass attempted to move.
    pub scanned: usize,
    /// Files moved per category. Categories with no files are absent.
    pub counts: BTreeMap<String, usize>,
    pub moved: Vec<FileMove>,
    pub errors: Vec<FileFailure>,
    pub skipped: Vec<SkippedFile>,
}

/// Writes a path as text, replacing bytes that are not valid UTF-8.
fn lossy_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

impl OrganizeReport {
    fn new(target: &Path) -> Self {
        Self {
            target: target.to_path_buf(),
            organized_root: target.join(ORGANIZED_DIR_NAME),
            ..Self::default()
        }
    }

    /// Total number of files moved.
    pub fn total_moved(&self) -> usize {
        self.counts.values().sum()
    }

    /// Files moved into `category`.
    pub fn count(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    /// Returns true if every scanned file was moved.
    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Per-file notifications emitted while a pass runs.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Started { total: usize },
    Moved(&'a FileMove),
    Failed(&'a FileFailure),
}

/// Which files of the target folder take part in a pass.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    filters: CompiledFilters,
    protected: Vec<PathBuf>,
}

impl Default for OrganizeOptions {
    /// Default filters (hidden files skipped) and the running executable
    /// protected.
    fn default() -> Self {
        let options = Self {
            filters: CompiledFilters::default(),
            protected: Vec::new(),
        };
        match std::env::current_exe() {
            Ok(exe) => options.protect(exe),
            Err(e) => {
                debug!("Cannot resolve current executable: {}", e);
                options
            }
        }
    }
}

impl OrganizeOptions {
    /// Replaces the filter rules.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Never move the file at `path`, wherever it is referenced from.
    pub fn protect(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = fs::canonicalize(&path).unwrap_or(path);
        if !self.protected.contains(&path) {
            self.protected.push(path);
        }
        self
    }

    /// Protected paths, canonicalized where possible.
    pub fn protected(&self) -> &[PathBuf] {
        &self.protected
    }

    fn is_protected(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        // Only canonicalize when a file name already matches.
        if !self.protected.iter().any(|p| p.file_name() == Some(name)) {
            return false;
        }
        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.protected.contains(&canonical)
    }
}

/// Organizes files by moving them into category subdirectories.
#[derive(Debug, Clone, Default)]
pub struct FileOrganizer {
    table: CategoryTable,
    options: OrganizeOptions,
}

impl FileOrganizer {
    pub fn new(table: CategoryTable, options: OrganizeOptions) -> Self {
        Self { table, options }
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Lists the files a pass over `target` would process.
    ///
    /// Only regular files directly inside `target` are considered. The
    /// `Organized_Files` folder and other directories are ignored; symlinks
    /// are reported as skipped.
    ///
    /// # Errors
    ///
    /// Returns an `OrganizeError` if `target` is missing, not a directory, or
    /// cannot be listed.
    pub fn scan(&self, target: &Path) -> Result<ScanOutcome, OrganizeError> {
        check_target(target)?;

        let entries = fs::read_dir(target).map_err(|e| OrganizeError::ReadDir {
            path: target.to_path_buf(),
            source: e,
        })?;

        let mut outcome = ScanOutcome::default();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", target.display(), e);
                    continue;
                }
            };

            if entry.file_name() == ORGANIZED_DIR_NAME {
                continue;
            }

            let path = entry.path();
            match entry.file_type() {
                Ok(file_type) if file_type.is_file() => {}
                Ok(file_type) if file_type.is_symlink() => {
                    debug!("Skipping symlink {}", path.display());
                    outcome.skipped.push(SkippedFile {
                        path,
                        reason: SkipReason::Symlink,
                    });
                    continue;
                }
                Ok(_) => {
                    debug!("Ignoring non-file entry {}", path.display());
                    continue;
                }
                Err(e) => {
                    warn!("Cannot stat {}: {}", path.display(), e);
                    continue;
                }
            }

            let reason = if self.options.is_protected(&path) {
                Some(SkipReason::Protected)
            } else if !self.options.filters.should_include(&path) {
                Some(SkipReason::Filtered)
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    debug!("Skipping {} ({:?})", path.display(), reason);
                    outcome.skipped.push(SkippedFile { path, reason });
                }
                None => outcome.files.push(FileEntry::new(path)),
            }
        }

        outcome.files.sort_by(|a, b| a.path.cmp(&b.path));
        outcome.skipped.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(outcome)
    }

    /// Computes where every file would go, without touching the filesystem.
    ///
    /// Collision renaming accounts for both existing files and names claimed
    /// earlier in the same plan, so the result matches what `organize`
    /// would do on an unchanged folder.
    pub fn plan(&self, target: &Path) -> Result<Vec<FileMove>, OrganizeError> {
        let outcome = self.scan(target)?;
        let root = target.join(ORGANIZED_DIR_NAME);
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        let planned = outcome
            .files
            .iter()
            .filter_map(|entry| {
                let category = self.table.classify(&entry.extension);
                let dir = root.join(category);
                let file_name = entry.path.file_name()?;
                let (destination, renamed) = (0u64..)
                    .map(|attempt| (dir.join(candidate_name(file_name, attempt)), attempt > 0))
                    .find(|(candidate, _)| {
                        !claimed.contains(candidate) && fs::symlink_metadata(candidate).is_err()
                    })?;
                claimed.insert(destination.clone());
                Some(FileMove {
                    source: entry.path.clone(),
                    destination,
                    category: category.to_string(),
                    renamed,
                })
            })
            .collect();

        Ok(planned)
    }

    /// Runs one organize pass over `target`.
    ///
    /// # Errors
    ///
    /// Fails only if `target` cannot be listed. Per-file failures are
    /// collected in [`OrganizeReport::errors`].
    pub fn organize(&self, target: &Path) -> Result<OrganizeReport, OrganizeError> {
        self.organize_with_progress(target, |_| {})
    }

    /// Like [`FileOrganizer::organize`], reporting each file as it is handled.
    pub fn organize_with_progress<F>(
        &self,
        target: &Path,
        mut progress: F,
    ) -> Result<OrganizeReport, OrganizeError>
    where
        F: FnMut(Progress<'_>),
    {
        let outcome = self.scan(target)?;
        let mut report = OrganizeReport::new(target);
        report.scanned = outcome.files.len();
        report.skipped = outcome.skipped;

        info!(
            "Organizing {} files in {}",
            report.scanned,
            target.display()
        );
        progress(Progress::Started {
            total: report.scanned,
        });

        for entry in &outcome.files {
            let category = self.table.classify(&entry.extension);
            debug!("{} -> {}", entry.name, category);

            let category_dir = report.organized_root.join(category);
            match move_to_category(&entry.path, &category_dir, category) {
                Ok(moved) => {
                    *report.counts.entry(category.to_string()).or_insert(0) += 1;
                    progress(Progress::Moved(&moved));
                    report.moved.push(moved);
                }
                Err(e) => {
                    warn!("{}", e);
                    let failure = FileFailure {
                        path: entry.path.clone(),
                        message: e.to_string(),
                    };
                    progress(Progress::Failed(&failure));
                    report.errors.push(failure);
                }
            }
        }

        info!(
            "Moved {} of {} files ({} failed)",
            report.total_moved(),
            report.scanned,
            report.errors.len()
        );
        Ok(report)
    }
}

/// Organizes `target` with the standard category table and default options.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// let report = foldersort::organize(Path::new("/home/user/Downloads"))?;
/// println!("Moved {} files", report.total_moved());
/// # Ok::<(), foldersort::OrganizeError>(())
/// ```
pub fn organize(target: &Path) -> Result<OrganizeReport, OrganizeError> {
    FileOrganizer::default().organize(target)
}

fn check_target(target: &Path) -> Result<(), OrganizeError> {
    let metadata = fs::metadata(target).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => OrganizeError::NotFound {
            path: target.to_path_buf(),
        },
        _ => OrganizeError::ReadDir {
            path: target.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(OrganizeError::NotADirectory {
            path: target.to_path_buf(),
        });
    }
    Ok(())
}

/// The destination name for a given collision attempt.
///
/// Attempt 0 is the original name; attempt `n` inserts `(n)` before the
/// extension: `report.pdf`, `report(1).pdf`, `report(2).pdf`.
pub fn candidate_name(file_name: &OsStr, attempt: u64) -> OsString {
    if attempt == 0 {
        return file_name.to_os_string();
    }

    let as_path = Path::new(file_name);
    let mut name = as_path.file_stem().unwrap_or(file_name).to_os_string();
    name.push(format!("({attempt})"));
    if let Some(ext) = as_path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Moves a file into `category_dir`, creating the directory if needed and
/// renaming on collision.
///
/// The destination name is claimed with create-new semantics before the
/// rename, so a file that appears concurrently under the same name is never
/// overwritten.
///
/// # Examples
///
/// ```no_run
/// use foldersort::file_organizer::move_to_category;
/// use std::path::Path;
///
/// let moved = move_to_category(
///     Path::new("/data/report.pdf"),
///     Path::new("/data/Organized_Files/PDFs"),
///     "PDFs",
/// );
///
/// match moved {
///     Ok(m) => println!("Moved to {}", m.destination.display()),
///     Err(e) => eprintln!("Organization failed: {}", e),
/// }
/// ```
pub fn move_to_category(
    file_path: &Path,
    category_dir: &Path,
    category: &str,
) -> Result<FileMove, MoveError> {
    let file_name = file_path
        .file_name()
        .ok_or_else(|| MoveError::NoFileName {
            path: file_path.to_path_buf(),
        })?;

    fs::create_dir_all(category_dir).map_err(|e| MoveError::DirectoryCreationFailed {
        path: category_dir.to_path_buf(),
        source: e,
    })?;

    let (destination, renamed) = reserve_destination(category_dir, file_name)?;

    if let Err(e) = relocate(file_path, &destination) {
        if let Err(cleanup) = fs::remove_file(&destination) {
            warn!(
                "Could not remove placeholder {}: {}",
                destination.display(),
                cleanup
            );
        }
        return Err(MoveError::FileMoveFailure {
            from: file_path.to_path_buf(),
            to: destination,
            source: e,
        });
    }

    if renamed {
        debug!(
            "Renamed {} to {} (name taken)",
            file_name.to_string_lossy(),
            destination.display()
        );
    }

    Ok(FileMove {
        source: file_path.to_path_buf(),
        destination,
        category: category.to_string(),
        renamed,
    })
}

/// Claims the first free candidate name in `dir` by creating an empty file.
fn reserve_destination(dir: &Path, file_name: &OsStr) -> Result<(PathBuf, bool), MoveError> {
    let mut attempt = 0u64;
    loop {
        let candidate = dir.join(candidate_name(file_name, attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(_) => return Ok((candidate, attempt > 0)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => {
                return Err(MoveError::ReservationFailed {
                    dir: dir.to_path_buf(),
                    source: e,
                });
            }
        }
    }
}

/// Renames `from` onto `to`, falling back to copy-then-delete only when the
/// two paths are on different filesystems.
fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!("Cross-device move of {}, copying", from.display());
            copy_then_remove(from, to)
        }
        Err(e) => Err(e),
    }
}

/// Copies `from` onto `to`, then deletes `from`. The source is only removed
/// once the copy has succeeded.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    fs::remove_file(from)
}
