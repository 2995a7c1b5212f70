//! The vendored-tree normalization pipeline.

use tracing::{debug, info, warn};
use vendorkit_io_fs::{EnumRemoveMissingStrategy, SpecCopyOptions, copy_tree, remove_tree};

use crate::error::FixupError;
use crate::report::ReportNormalize;
use crate::spec::{EnumFixupStep, SpecFixupPaths, SpecNormalizeLayout};

/// Replace the destination trees with pruned copies of the vendored ones.
///
/// Steps, each run to completion before the next:
/// 1. remove every `trees_replaced` entry under the destination root, a
///    missing tree being fine;
/// 2. copy every `trees_replaced` entry from the source root, onto a
///    destination that must not exist;
/// 3. remove every `dirs_pruned` entry from the copied `tree_pruned`, each of
///    which must exist.
///
/// The first failure is returned as is. Completed steps are not rolled back,
/// so the destination may be left without its trees, or with unpruned ones.
pub fn normalize(
    spec_paths: &SpecFixupPaths,
    spec_layout: &SpecNormalizeLayout,
) -> Result<ReportNormalize, FixupError> {
    spec_layout.validate()?;
    let mut report_norm = ReportNormalize::default();

    for name_tree in &spec_layout.trees_replaced {
        let path_dir_dst = spec_paths.path_dir_dest_root.join(name_tree);
        info!(step = %EnumFixupStep::Remove, path = %path_dir_dst.display(), "removing destination tree");
        let report_rm = remove_tree(&path_dir_dst, EnumRemoveMissingStrategy::Ignore)
            .map_err(|e| FixupError::from_remove(EnumFixupStep::Remove, e))?;
        debug!("{report_rm}");
        report_norm.l_reports_removed.push(report_rm);
    }

    for name_tree in &spec_layout.trees_replaced {
        let path_dir_src = spec_paths.path_dir_source_root.join(name_tree);
        let path_dir_dst = spec_paths.path_dir_dest_root.join(name_tree);
        info!(
            step = %EnumFixupStep::Copy,
            source = %path_dir_src.display(),
            path = %path_dir_dst.display(),
            "copying vendored tree"
        );
        let report_cp = copy_tree(&path_dir_src, &path_dir_dst, SpecCopyOptions::default())
            .map_err(|e| FixupError::from_copy(EnumFixupStep::Copy, e))?;
        for warning in &report_cp.warnings {
            warn!(step = %EnumFixupStep::Copy, "{warning}");
        }
        debug!("{report_cp}");
        if !report_cp.is_complete() {
            return Err(FixupError::CopyIncomplete {
                path: path_dir_dst,
                errors: report_cp.errors,
            });
        }
        report_norm.l_reports_copied.push((path_dir_dst, report_cp));
    }

    let path_dir_pruned = spec_paths.path_dir_dest_root.join(&spec_layout.tree_pruned);
    for name_dir in &spec_layout.dirs_pruned {
        let path_dir_target = path_dir_pruned.join(name_dir);
        info!(step = %EnumFixupStep::Prune, path = %path_dir_target.display(), "pruning directory");
        let report_rm = remove_tree(&path_dir_target, EnumRemoveMissingStrategy::Error)
            .map_err(|e| FixupError::from_remove(EnumFixupStep::Prune, e))?;
        debug!("{}", report_rm.format("[PRUNE]"));
        report_norm.l_reports_pruned.push(report_rm);
    }

    Ok(report_norm)
}
