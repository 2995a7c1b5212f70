//! Per-run report of the normalizer.

use std::fmt;
use std::path::PathBuf;

use vendorkit_io_fs::{ReportCopy, ReportRemove};

/// What each pipeline step did, in execution order.
#[derive(Debug, Default, Clone)]
pub struct ReportNormalize {
    /// Tolerant removals of destination trees.
    pub l_reports_removed: Vec<ReportRemove>,
    /// Destination tree root and its copy report.
    pub l_reports_copied: Vec<(PathBuf, ReportCopy)>,
    /// Strict removals from the copied tree.
    pub l_reports_pruned: Vec<ReportRemove>,
}

impl ReportNormalize {
    /// Files and symlinks written across all copied trees.
    pub fn cnt_copied(&self) -> u64 {
        self.l_reports_copied
            .iter()
            .map(|(_, report_cp)| report_cp.cnt_copied)
            .sum()
    }

    /// Entries deleted by the pruning steps (files and directories).
    pub fn cnt_pruned(&self) -> u64 {
        self.l_reports_pruned
            .iter()
            .map(|report_rm| report_rm.cnt_removed_files + report_rm.cnt_removed_dirs)
            .sum()
    }

    /// Warnings collected by the copy steps.
    pub fn warning_count(&self) -> usize {
        self.l_reports_copied
            .iter()
            .map(|(_, report_cp)| report_cp.warning_count())
            .sum()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let n_trees_replaced = self
            .l_reports_removed
            .iter()
            .filter(|report_rm| report_rm.if_existed)
            .count();
        format!(
            "{prefix} replaced={}/{} copied={} pruned_dirs={} pruned_entries={} warnings={}",
            n_trees_replaced,
            self.l_reports_removed.len(),
            self.cnt_copied(),
            self.l_reports_pruned.len(),
            self.cnt_pruned(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportNormalize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[FIXUP]"))
    }
}
