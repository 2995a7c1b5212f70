//! Filesystem tree traversal and copy orchestration.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{CopyTreeError, EnumCopySymlinkStrategy, SpecCopyOptions};
use crate::util::{
    SpecIgnorePatterns, copy_dir_metadata, copy_file_with_metadata,
    create_symbolic_link, derive_destination_path, is_broken_symlink, is_overlap,
};

#[derive(Debug, Clone)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
    name_dir: String,
    if_is_symlink: bool,
}

#[derive(Debug, Clone)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file: String,
    if_is_symlink: bool,
}

#[derive(Debug, Clone)]
struct SpecCopyTask {
    path_src: PathBuf,
    path_dst: PathBuf,
}

#[derive(Debug)]
struct SpecCopyContext {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    rule_symlink: EnumCopySymlinkStrategy,
    spec_ignore: SpecIgnorePatterns,
    builder_cp_report: ReportCopyBuilder,
    /// Identities of the directories on the current descent path.
    set_dirs_on_path: HashSet<(u64, u64)>,
    l_tasks_file_copy: Vec<SpecCopyTask>,
    l_tasks_dir_metadata: Vec<SpecCopyTask>,
}

/// Copy the directory tree `dir_source` to the new directory `dir_destination`.
///
/// `dir_destination` must not exist; its missing parents are created. The
/// relative structure is preserved, file bytes and permissions are copied, and
/// on Linux timestamps and extended attributes follow as well. Directory
/// metadata is applied after all files are written.
///
/// Behavior is controlled by [`SpecCopyOptions`]:
/// - basename ignore patterns (glob),
/// - symlink handling strategy (dereference by default).
///
/// Returns [`ReportCopy`] when the run completes. Per-entry failures (unreadable
/// files, broken symlinks, symlink cycles) do not stop the walk; they are stored in the
/// report and the caller decides whether the copy is acceptable. Returns
/// [`CopyTreeError`] only for validation/setup failures, before anything is
/// written.
pub fn copy_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_cp_options: SpecCopyOptions,
) -> Result<ReportCopy, CopyTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    let meta_dir_src = match fs::metadata(&path_dir_src) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CopyTreeError::SourceNotFound(path_dir_src));
        }
        Err(e) => {
            return Err(CopyTreeError::SourceInspectFailed {
                path: path_dir_src,
                source: e,
            });
        }
    };
    if !meta_dir_src.is_dir() {
        return Err(CopyTreeError::SourceNotDirectory(path_dir_src));
    }

    match fs::symlink_metadata(&path_dir_dst) {
        Ok(_) => return Err(CopyTreeError::DestinationExists(path_dir_dst)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(CopyTreeError::DestinationInitFailed {
                path: path_dir_dst,
                source: e,
            });
        }
    }

    if is_overlap(&path_dir_src, &path_dir_dst) {
        return Err(CopyTreeError::SourceDestinationOverlap {
            path_source: path_dir_src,
            path_destination: path_dir_dst,
        });
    }

    let spec_ignore = SpecIgnorePatterns::from_raw(spec_cp_options.patterns_ignore.as_deref())?;

    if let Some(path_parent_dst) = path_dir_dst.parent()
        && !path_parent_dst.as_os_str().is_empty()
    {
        fs::create_dir_all(path_parent_dst).map_err(|e| CopyTreeError::DestinationInitFailed {
            path: path_dir_dst.clone(),
            source: e,
        })?;
    }
    fs::create_dir(&path_dir_dst).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            CopyTreeError::DestinationExists(path_dir_dst.clone())
        } else {
            CopyTreeError::DestinationInitFailed {
                path: path_dir_dst.clone(),
                source: e,
            }
        }
    })?;

    let mut spec_cp_ctx = SpecCopyContext {
        path_dir_src: path_dir_src.clone(),
        path_dir_dst: path_dir_dst.clone(),
        rule_symlink: spec_cp_options.rule_symlink,
        spec_ignore,
        builder_cp_report: ReportCopyBuilder::default(),
        set_dirs_on_path: HashSet::new(),
        l_tasks_file_copy: Vec::new(),
        l_tasks_dir_metadata: Vec::new(),
    };
    spec_cp_ctx.builder_cp_report.add_dir();
    spec_cp_ctx.l_tasks_dir_metadata.push(SpecCopyTask {
        path_src: path_dir_src.clone(),
        path_dst: path_dir_dst,
    });

    walk_directory(&path_dir_src, &mut spec_cp_ctx);
    flush_file_copy_tasks(&mut spec_cp_ctx);
    flush_dir_metadata_tasks(&mut spec_cp_ctx);
    Ok(spec_cp_ctx.builder_cp_report.build())
}

fn flush_file_copy_tasks(spec_cp_ctx: &mut SpecCopyContext) {
    let l_tasks_file_copy = std::mem::take(&mut spec_cp_ctx.l_tasks_file_copy);
    for spec_task in l_tasks_file_copy {
        match copy_file_with_metadata(&spec_task.path_src, &spec_task.path_dst) {
            Ok(()) => spec_cp_ctx.builder_cp_report.add_copied(),
            Err(e) => {
                let msg = format!(
                    "{} -> {}: {e}",
                    spec_task.path_src.display(),
                    spec_task.path_dst.display()
                );
                spec_cp_ctx.builder_cp_report.add_error(spec_task.path_dst, msg);
            }
        }
    }
}

/// Deepest directories first, so a read-only parent is locked only after
/// its children have their final metadata.
fn flush_dir_metadata_tasks(spec_cp_ctx: &mut SpecCopyContext) {
    let l_tasks_dir_metadata = std::mem::take(&mut spec_cp_ctx.l_tasks_dir_metadata);
    for spec_task in l_tasks_dir_metadata.into_iter().rev() {
        if let Err(e) = copy_dir_metadata(&spec_task.path_src, &spec_task.path_dst) {
            spec_cp_ctx.builder_cp_report.add_error(
                spec_task.path_dst,
                format!("Failed to copy directory metadata ({e})"),
            );
        }
    }
}

/// Identity of a directory for cycle detection.
#[cfg(unix)]
fn dir_identity(meta_dir: &fs::Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    Some((meta_dir.dev(), meta_dir.ino()))
}

#[cfg(not(unix))]
fn dir_identity(_meta_dir: &fs::Metadata) -> Option<(u64, u64)> {
    None
}

fn walk_directory(path_root: &Path, spec_cp_ctx: &mut SpecCopyContext) {
    let mut key_dir_entered = None;
    if spec_cp_ctx.rule_symlink == EnumCopySymlinkStrategy::Dereference {
        let meta_root = match fs::metadata(path_root) {
            Ok(v) => v,
            Err(e) => {
                spec_cp_ctx.builder_cp_report.add_error(
                    path_root.to_path_buf(),
                    format!("Failed to stat directory {} ({e})", path_root.display()),
                );
                return;
            }
        };
        // Only an ancestor counts as a cycle; a directory reached again
        // through a sibling alias is copied again.
        if let Some(key_dir) = dir_identity(&meta_root) {
            if !spec_cp_ctx.set_dirs_on_path.insert(key_dir) {
                spec_cp_ctx.builder_cp_report.add_error(
                    path_root.to_path_buf(),
                    format!("Symlink loop detected: {}", path_root.display()),
                );
                return;
            }
            key_dir_entered = Some(key_dir);
        }
    }

    walk_directory_entries(path_root, spec_cp_ctx);

    if let Some(key_dir) = key_dir_entered {
        spec_cp_ctx.set_dirs_on_path.remove(&key_dir);
    }
}

fn walk_directory_entries(path_root: &Path, spec_cp_ctx: &mut SpecCopyContext) {
    let mut l_dirs: Vec<SpecDirEntry> = Vec::new();
    let mut l_files: Vec<SpecFileEntry> = Vec::new();

    let iter_entries = match fs::read_dir(path_root) {
        Ok(iter) => iter,
        Err(e) => {
            spec_cp_ctx.builder_cp_report.add_error(
                path_root.to_path_buf(),
                format!("Failed to read directory {} ({e})", path_root.display()),
            );
            return;
        }
    };

    for entry_res in iter_entries {
        let entry = match entry_res {
            Ok(v) => v,
            Err(e) => {
                spec_cp_ctx.builder_cp_report.add_error(
                    path_root.to_path_buf(),
                    format!(
                        "Failed to read directory entry under {} ({e})",
                        path_root.display()
                    ),
                );
                continue;
            }
        };

        let path_entry = entry.path();
        let c_name = entry.file_name().to_string_lossy().to_string();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                spec_cp_ctx.builder_cp_report.add_error(
                    path_entry.clone(),
                    format!("Failed to inspect {} ({e})", path_entry.display()),
                );
                continue;
            }
        };

        let b_is_symlink = cfg_file_type.is_symlink();
        let b_is_dir = cfg_file_type.is_dir() || (b_is_symlink && path_entry.is_dir());
        if b_is_dir {
            l_dirs.push(SpecDirEntry {
                path_dir_src_sub: path_entry,
                name_dir: c_name,
                if_is_symlink: b_is_symlink,
            });
        } else if cfg_file_type.is_file() || b_is_symlink {
            l_files.push(SpecFileEntry {
                path_file_src: path_entry,
                name_file: c_name,
                if_is_symlink: b_is_symlink,
            });
        } else {
            spec_cp_ctx.builder_cp_report.add_scanned();
            spec_cp_ctx.builder_cp_report.add_skipped();
            spec_cp_ctx
                .builder_cp_report
                .add_warning(format!("Special file skipped: {}", path_entry.display()));
        }
    }

    l_dirs.sort_by(|a, b| a.name_dir.cmp(&b.name_dir));
    l_files.sort_by(|a, b| a.name_file.cmp(&b.name_file));

    for dir_entry in l_dirs {
        let path_next = dir_entry.path_dir_src_sub.clone();
        if handle_dir_entry(dir_entry, spec_cp_ctx) {
            walk_directory(&path_next, spec_cp_ctx);
        }
    }

    for file_entry in l_files {
        handle_file_entry(file_entry, spec_cp_ctx);
    }
}

/// Create the destination directory for one source directory.
/// Returns whether the walk should descend into it.
fn handle_dir_entry(spec_dir_entry: SpecDirEntry, spec_cp_ctx: &mut SpecCopyContext) -> bool {
    spec_cp_ctx.builder_cp_report.add_scanned();
    if spec_cp_ctx.spec_ignore.is_ignored(&spec_dir_entry.name_dir) {
        spec_cp_ctx.builder_cp_report.add_skipped();
        return false;
    }

    let path_dir_dst_sub = derive_destination_path(
        &spec_dir_entry.path_dir_src_sub,
        &spec_cp_ctx.path_dir_src,
        &spec_cp_ctx.path_dir_dst,
    );

    if spec_dir_entry.if_is_symlink {
        match spec_cp_ctx.rule_symlink {
            EnumCopySymlinkStrategy::SkipSymlinks => {
                spec_cp_ctx.builder_cp_report.add_skipped();
                return false;
            }
            EnumCopySymlinkStrategy::CopySymlinks => {
                create_symbolic_link(
                    &spec_dir_entry.path_dir_src_sub,
                    &path_dir_dst_sub,
                    &mut spec_cp_ctx.builder_cp_report,
                );
                return false;
            }
            EnumCopySymlinkStrategy::Dereference => {}
        }
    }

    if let Err(e) = fs::create_dir(&path_dir_dst_sub) {
        spec_cp_ctx
            .builder_cp_report
            .add_error(path_dir_dst_sub, e.to_string());
        return false;
    }
    spec_cp_ctx.builder_cp_report.add_dir();
    spec_cp_ctx.l_tasks_dir_metadata.push(SpecCopyTask {
        path_src: spec_dir_entry.path_dir_src_sub,
        path_dst: path_dir_dst_sub,
    });
    true
}

fn handle_file_entry(spec_file_entry: SpecFileEntry, spec_cp_ctx: &mut SpecCopyContext) {
    spec_cp_ctx.builder_cp_report.add_scanned();
    if spec_cp_ctx.spec_ignore.is_ignored(&spec_file_entry.name_file) {
        spec_cp_ctx.builder_cp_report.add_skipped();
        return;
    }

    let path_file_dst = derive_destination_path(
        &spec_file_entry.path_file_src,
        &spec_cp_ctx.path_dir_src,
        &spec_cp_ctx.path_dir_dst,
    );

    let enum_rule_symlink = spec_cp_ctx.rule_symlink;
    if spec_file_entry.if_is_symlink {
        if enum_rule_symlink == EnumCopySymlinkStrategy::SkipSymlinks {
            spec_cp_ctx.builder_cp_report.add_skipped();
            return;
        }
        if enum_rule_symlink == EnumCopySymlinkStrategy::CopySymlinks {
            create_symbolic_link(
                &spec_file_entry.path_file_src,
                &path_file_dst,
                &mut spec_cp_ctx.builder_cp_report,
            );
            return;
        }
        if is_broken_symlink(&spec_file_entry.path_file_src, enum_rule_symlink) {
            spec_cp_ctx.builder_cp_report.add_error(
                spec_file_entry.path_file_src.clone(),
                format!(
                    "Broken symlink: {}",
                    spec_file_entry.path_file_src.display()
                ),
            );
            return;
        }

        let meta_file_src_target = match fs::metadata(&spec_file_entry.path_file_src) {
            Ok(v) => v,
            Err(e) => {
                spec_cp_ctx
                    .builder_cp_report
                    .add_error(spec_file_entry.path_file_src.clone(), e.to_string());
                return;
            }
        };
        if !meta_file_src_target.file_type().is_file() {
            spec_cp_ctx.builder_cp_report.add_warning(format!(
                "Special file target skipped: {}",
                spec_file_entry.path_file_src.display()
            ));
            spec_cp_ctx.builder_cp_report.add_skipped();
            return;
        }
    }

    spec_cp_ctx.l_tasks_file_copy.push(SpecCopyTask {
        path_src: spec_file_entry.path_file_src,
        path_dst: path_file_dst,
    });
}
