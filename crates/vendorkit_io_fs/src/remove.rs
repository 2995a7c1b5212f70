//! Recursive directory removal with an explicit missing-target policy.

use std::fs;
use std::io;
use std::path::Path;

use crate::report::ReportRemove;
use crate::spec::{EnumRemoveMissingStrategy, RemoveTreeError};

/// Delete the directory `dir_target` and everything below it.
///
/// Symlinks found inside the tree are unlinked, never followed. The walk is
/// depth-first and stops at the first failure; whatever was deleted before
/// that stays deleted.
///
/// `rule_missing` decides what an absent `dir_target` means. It applies to the
/// target itself only: an entry that disappears mid-walk is an error.
pub fn remove_tree<P>(
    dir_target: P,
    rule_missing: EnumRemoveMissingStrategy,
) -> Result<ReportRemove, RemoveTreeError>
where
    P: AsRef<Path>,
{
    let path_dir_target = dir_target.as_ref().to_path_buf();
    let mut report_rm = ReportRemove::new(path_dir_target.clone());

    let meta_target = match fs::symlink_metadata(&path_dir_target) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return match rule_missing {
                EnumRemoveMissingStrategy::Ignore => Ok(report_rm),
                EnumRemoveMissingStrategy::Error => {
                    Err(RemoveTreeError::NotFound(path_dir_target))
                }
            };
        }
        Err(e) => {
            return Err(RemoveTreeError::Io {
                path: path_dir_target,
                source: e,
            });
        }
    };
    if !meta_target.file_type().is_dir() {
        return Err(RemoveTreeError::NotDirectory(path_dir_target));
    }

    report_rm.if_existed = true;
    remove_dir_contents(&path_dir_target, &mut report_rm)?;
    fs::remove_dir(&path_dir_target).map_err(|e| RemoveTreeError::Io {
        path: path_dir_target.clone(),
        source: e,
    })?;
    report_rm.cnt_removed_dirs += 1;
    Ok(report_rm)
}

fn remove_dir_contents(
    path_dir: &Path,
    report_rm: &mut ReportRemove,
) -> Result<(), RemoveTreeError> {
    let iter_entries = fs::read_dir(path_dir).map_err(|e| RemoveTreeError::Io {
        path: path_dir.to_path_buf(),
        source: e,
    })?;

    for entry_res in iter_entries {
        let entry = entry_res.map_err(|e| RemoveTreeError::Io {
            path: path_dir.to_path_buf(),
            source: e,
        })?;
        let path_entry = entry.path();
        let cfg_file_type = entry.file_type().map_err(|e| RemoveTreeError::Io {
            path: path_entry.clone(),
            source: e,
        })?;

        if cfg_file_type.is_dir() {
            remove_dir_contents(&path_entry, report_rm)?;
            fs::remove_dir(&path_entry).map_err(|e| RemoveTreeError::Io {
                path: path_entry.clone(),
                source: e,
            })?;
            report_rm.cnt_removed_dirs += 1;
        } else {
            remove_entry_link(&path_entry, cfg_file_type.is_symlink()).map_err(|e| {
                RemoveTreeError::Io {
                    path: path_entry.clone(),
                    source: e,
                }
            })?;
            report_rm.cnt_removed_files += 1;
        }
    }
    Ok(())
}

fn remove_entry_link(path_entry: &Path, if_is_symlink: bool) -> Result<(), io::Error> {
    match fs::remove_file(path_entry) {
        // Directory symlinks and junctions are removed as directories on Windows.
        Err(e) if cfg!(windows) && if_is_symlink => fs::remove_dir(path_entry).map_err(|_| e),
        res => res,
    }
}
