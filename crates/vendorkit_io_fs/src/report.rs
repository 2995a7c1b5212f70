//! Copy/remove report models and mutable report builder.

use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecCopyError;

/// Aggregate counters and diagnostics for one `copy_tree` run.
#[derive(Debug, Default, Clone)]
pub struct ReportCopy {
    /// Total scanned directory/file entries below the source root.
    pub cnt_scanned: u64,
    /// Number of files and symlinks successfully written.
    pub cnt_copied: u64,
    /// Number of directories created (destination root included).
    pub cnt_dirs: u64,
    /// Number of entries skipped by ignore patterns or symlink policy.
    pub cnt_skipped: u64,
    /// Non-fatal warnings collected during traversal/copy.
    pub warnings: Vec<String>,
    /// Per-entry failures.
    pub errors: Vec<SpecCopyError>,
}

impl ReportCopy {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// `true` when every scanned entry was either copied or deliberately skipped.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} copied={} dirs={} skipped={} errors={} warnings={}",
            self.cnt_scanned,
            self.cnt_copied,
            self.cnt_dirs,
            self.cnt_skipped,
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[COPY]"))
    }
}

/// Mutable accumulator for copy statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportCopyBuilder {
    /// See [`ReportCopy::cnt_scanned`].
    pub cnt_scanned: u64,
    /// See [`ReportCopy::cnt_copied`].
    pub cnt_copied: u64,
    /// See [`ReportCopy::cnt_dirs`].
    pub cnt_dirs: u64,
    /// See [`ReportCopy::cnt_skipped`].
    pub cnt_skipped: u64,
    /// See [`ReportCopy::errors`].
    pub errors: Vec<SpecCopyError>,
    /// See [`ReportCopy::warnings`].
    pub warnings: Vec<String>,
}

impl ReportCopyBuilder {
    /// Increment scanned count by one.
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    /// Increment copied count by one.
    pub fn add_copied(&mut self) {
        self.cnt_copied += 1;
    }

    /// Increment created-directory count by one.
    pub fn add_dir(&mut self) {
        self.cnt_dirs += 1;
    }

    /// Increment skipped count by one.
    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.errors.push(SpecCopyError { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportCopy {
        ReportCopy {
            cnt_scanned: self.cnt_scanned,
            cnt_copied: self.cnt_copied,
            cnt_dirs: self.cnt_dirs,
            cnt_skipped: self.cnt_skipped,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

/// Outcome of one `remove_tree` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRemove {
    /// Target directory.
    pub path: PathBuf,
    /// `false` when the target was already absent (and absence was tolerated).
    pub if_existed: bool,
    /// Files and symlinks unlinked.
    pub cnt_removed_files: u64,
    /// Directories removed, the target itself included.
    pub cnt_removed_dirs: u64,
}

impl ReportRemove {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            if_existed: false,
            cnt_removed_files: 0,
            cnt_removed_dirs: 0,
        }
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        if !self.if_existed {
            return format!("{prefix} {} absent", self.path.display());
        }
        format!(
            "{prefix} {} files={} dirs={}",
            self.path.display(),
            self.cnt_removed_files,
            self.cnt_removed_dirs
        )
    }
}

impl fmt::Display for ReportRemove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[REMOVE]"))
    }
}
