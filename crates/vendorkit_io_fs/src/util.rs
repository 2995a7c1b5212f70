use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::report::ReportCopyBuilder;
use crate::spec::{CopyTreeError, EnumCopySymlinkStrategy};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

/// Compiled ignore patterns; matched against entry basenames only.
#[derive(Debug, Clone, Default)]
pub(crate) struct SpecIgnorePatterns {
    set_globs: Option<GlobSet>,
}

impl SpecIgnorePatterns {
    pub(crate) fn from_raw(patterns_ignore: Option<&[String]>) -> Result<Self, CopyTreeError> {
        let Some(patterns_ignore) = patterns_ignore else {
            return Ok(Self::default());
        };
        if patterns_ignore.is_empty() {
            return Ok(Self::default());
        }

        let mut builder_globs = GlobSetBuilder::new();
        for pattern in patterns_ignore {
            let glob = Glob::new(pattern).map_err(|e| CopyTreeError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            builder_globs.add(glob);
        }
        let set_globs = builder_globs
            .build()
            .map_err(|e| CopyTreeError::InvalidPattern {
                pattern: patterns_ignore.join(","),
                message: e.to_string(),
            })?;
        Ok(Self {
            set_globs: Some(set_globs),
        })
    }

    pub(crate) fn is_ignored(&self, name: &str) -> bool {
        self.set_globs
            .as_ref()
            .is_some_and(|set_globs| set_globs.is_match(name))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    // Not-yet-existing destination: resolve the nearest existing ancestor.
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && !parent.as_os_str().is_empty()
    {
        return _normalize_path(parent).join(name);
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

pub(crate) fn is_broken_symlink(
    path_symlink: &Path,
    rule_symlink: EnumCopySymlinkStrategy,
) -> bool {
    rule_symlink == EnumCopySymlinkStrategy::Dereference && !path_symlink.exists()
}

pub(crate) fn derive_destination_path(
    path_src: &Path,
    path_dir_src: &Path,
    path_dir_dst: &Path,
) -> PathBuf {
    match path_src.strip_prefix(path_dir_src) {
        Ok(path_rel) => path_dir_dst.join(path_rel),
        Err(_) => path_dir_dst.join(path_src.file_name().unwrap_or_default()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EntryWriters

pub(crate) fn create_symbolic_link(
    path_src: &Path,
    path_dst: &Path,
    builder_cp_report: &mut ReportCopyBuilder,
) {
    let target = match fs::read_link(path_src) {
        Ok(v) => v,
        Err(e) => {
            builder_cp_report.add_error(path_dst.to_path_buf(), e.to_string());
            return;
        }
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::symlink;
        match symlink(&target, path_dst) {
            Ok(_) => builder_cp_report.add_copied(),
            Err(e) => builder_cp_report.add_error(path_dst.to_path_buf(), e.to_string()),
        }
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::{symlink_dir, symlink_file};
        let res = if path_src.is_dir() {
            symlink_dir(&target, path_dst)
        } else {
            symlink_file(&target, path_dst)
        };
        match res {
            Ok(_) => builder_cp_report.add_copied(),
            Err(e) => builder_cp_report.add_error(path_dst.to_path_buf(), e.to_string()),
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = target;
        builder_cp_report.add_error(
            path_dst.to_path_buf(),
            "Symbolic links are unsupported on this platform".to_string(),
        );
    }
}

/// Copy file bytes and permissions; on Linux also timestamps and xattrs.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    #[cfg(target_os = "linux")]
    {
        apply_metadata_linux(path_file_src, path_file_dst)?;
        copy_xattrs_linux(path_file_src, path_file_dst);
    }
    Ok(())
}

/// Apply source directory permissions (and times on Linux) to a copied directory.
///
/// Must run after the directory's children are written: a read-only source
/// directory would otherwise block the copy.
pub(crate) fn copy_dir_metadata(
    path_dir_src: &Path,
    path_dir_dst: &Path,
) -> Result<(), io::Error> {
    #[cfg(target_os = "linux")]
    {
        apply_metadata_linux(path_dir_src, path_dir_dst)?;
        copy_xattrs_linux(path_dir_src, path_dir_dst);
    }
    #[cfg(not(target_os = "linux"))]
    {
        let stat_src = fs::metadata(path_dir_src)?;
        fs::set_permissions(path_dir_dst, stat_src.permissions())?;
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn apply_metadata_linux(path_src: &Path, path_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_src)?;
    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_dst, file_time_access, file_time_modify)?;
    fs::set_permissions(path_dst, stat_src.permissions())?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_src: &Path, path_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{SpecIgnorePatterns, derive_destination_path, is_overlap};
    use crate::spec::CopyTreeError;

    #[test]
    fn ignore_patterns_match_basenames() {
        let patterns = vec!["*.pyc".to_string(), "CVS".to_string()];
        let spec_ignore = SpecIgnorePatterns::from_raw(Some(patterns.as_slice())).expect("compile");
        assert!(spec_ignore.is_ignored("mod.pyc"));
        assert!(spec_ignore.is_ignored("CVS"));
        assert!(!spec_ignore.is_ignored("mod.py"));
    }

    #[test]
    fn empty_ignore_patterns_ignore_nothing() {
        let spec_ignore = SpecIgnorePatterns::from_raw(Some(&[] as &[String])).expect("compile");
        assert!(!spec_ignore.is_ignored("anything"));
        let spec_ignore = SpecIgnorePatterns::from_raw(None).expect("compile");
        assert!(!spec_ignore.is_ignored("anything"));
    }

    #[test]
    fn invalid_ignore_pattern_is_rejected() {
        let patterns = vec!["[".to_string()];
        let err = SpecIgnorePatterns::from_raw(Some(patterns.as_slice())).expect_err("must fail");
        assert!(matches!(err, CopyTreeError::InvalidPattern { pattern, .. } if pattern == "["));
    }

    #[test]
    fn destination_path_keeps_relative_structure() {
        let path_dst = derive_destination_path(
            Path::new("/vendor/src/asio/impl/src.cpp"),
            Path::new("/vendor/src"),
            Path::new("/out/src"),
        );
        assert_eq!(path_dst, Path::new("/out/src/asio/impl/src.cpp"));
    }

    #[test]
    fn overlap_detects_nested_missing_destination() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir");
        assert!(is_overlap(&src, &src.join("nested/deeper")));
        assert!(!is_overlap(&src, &tmp.path().join("dst")));
    }
}
