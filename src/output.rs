//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and formatted tables. Library code never prints; the CLI
//! routes everything user-facing through here.

use crate::file_organizer::{FileFailure, FileMove, OrganizeReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for operations
/// - Summary tables with statistics
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// OutputFormatter::success("Folder organized successfully!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates and returns a progress bar for file operations.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_with_message("Completed!");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a table of file counts by category, followed by a total row.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("PDFs".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_category_len = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Category" width

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                file_word(*count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            file_word(total_files),
            width = max_category_len
        );
    }

    /// Prints the list of files that could not be moved.
    pub fn failures(failures: &[FileFailure]) {
        if failures.is_empty() {
            return;
        }
        Self::header("FAILED");
        for failure in failures {
            Self::error(&format!("{}: {}", failure.path.display(), failure.message));
        }
    }

    /// Prints the full result of an organize pass.
    pub fn report(report: &OrganizeReport) {
        if report.scanned == 0 {
            Self::info("No files found to organize.");
            return;
        }

        Self::summary_table(&report.counts, report.total_moved());
        Self::failures(&report.errors);

        if report.total_moved() > 0 {
            Self::plain(&format!(
                "\nOrganized files location: {}",
                report.organized_root.display()
            ));
        }

        if report.is_complete_success() {
            Self::success(&format!(
                "Successfully organized {} {}!",
                report.total_moved(),
                file_word(report.total_moved())
            ));
        } else {
            Self::warning(&format!(
                "{} {} could not be organized. Please review errors above.",
                report.errors.len(),
                file_word(report.errors.len())
            ));
        }
    }

    /// Prints where each file would go, then per-category totals.
    pub fn plan(planned: &[FileMove]) {
        if planned.is_empty() {
            Self::dry_run_notice("No files found to organize.");
            return;
        }

        Self::dry_run_notice("Files would be organized as follows:");
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for planned_move in planned {
            let name = planned_move
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let destination_name = planned_move
                .destination
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!(
                " - {}\n   → Would move to {}/{}{}",
                name,
                planned_move.category,
                destination_name,
                if planned_move.renamed {
                    " (renamed, name taken)"
                } else {
                    ""
                }
            );
            *counts.entry(planned_move.category.clone()).or_insert(0) += 1;
        }

        Self::summary_table(&counts, planned.len());
        Self::success("Dry run complete. No files were modified.");
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
