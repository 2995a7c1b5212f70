//! Anchor directory resolution.
//!
//! All fixed paths hang off the directory holding the running executable, so
//! the tool behaves the same from any working directory.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::conf::C_ENV_ROOT_OVERRIDE;
use crate::error::FixupError;

/// Directory of the canonicalized executable, or `DDS_FIXUP_ROOT` when set.
pub fn resolve_anchor_dir() -> Result<PathBuf, FixupError> {
    derive_anchor_dir(std::env::var_os(C_ENV_ROOT_OVERRIDE), std::env::current_exe)
}

pub(crate) fn derive_anchor_dir<F>(
    value_override: Option<OsString>,
    fn_current_exe: F,
) -> Result<PathBuf, FixupError>
where
    F: FnOnce() -> io::Result<PathBuf>,
{
    if let Some(value_override) = value_override.filter(|v| !v.is_empty()) {
        let path_dir_anchor = std::path::absolute(PathBuf::from(value_override))
            .map_err(|source| FixupError::AnchorUnresolved { source })?;
        debug!(path = %path_dir_anchor.display(), "anchor taken from {C_ENV_ROOT_OVERRIDE}");
        return Ok(path_dir_anchor);
    }

    let path_exe = fn_current_exe().map_err(|source| FixupError::AnchorUnresolved { source })?;
    let path_exe =
        fs::canonicalize(&path_exe).map_err(|source| FixupError::AnchorUnresolved { source })?;
    let path_dir_anchor = path_exe
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| FixupError::AnchorUnresolved {
            source: io::Error::new(
                io::ErrorKind::NotFound,
                format!("executable has no parent directory: {}", path_exe.display()),
            ),
        })?;
    debug!(path = %path_dir_anchor.display(), "anchor taken from executable location");
    Ok(path_dir_anchor)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::io;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::derive_anchor_dir;
    use crate::error::FixupError;

    #[test]
    fn override_wins_over_executable() {
        let tmp = TempDir::new().expect("tempdir");
        let path_dir_anchor = derive_anchor_dir(Some(tmp.path().as_os_str().to_owned()), || {
            panic!("executable must not be consulted")
        })
        .expect("anchor");
        assert_eq!(path_dir_anchor, tmp.path());
    }

    #[test]
    fn empty_override_falls_back_to_executable_dir() {
        let tmp = TempDir::new().expect("tempdir");
        let path_exe = tmp.path().join("bin/dds-fixup");
        std::fs::create_dir_all(path_exe.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path_exe, "").expect("write exe");

        let path_exe_probe = path_exe.clone();
        let path_dir_anchor =
            derive_anchor_dir(Some(OsString::new()), move || Ok(path_exe_probe)).expect("anchor");
        let path_dir_expected = std::fs::canonicalize(tmp.path().join("bin")).expect("canon");
        assert_eq!(path_dir_anchor, path_dir_expected);
    }

    #[cfg(unix)]
    #[test]
    fn executable_symlink_is_resolved_to_install_location() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().expect("tempdir");
        let path_exe = tmp.path().join("install/dds-fixup");
        let path_link = tmp.path().join("bin/dds-fixup");
        std::fs::create_dir_all(path_exe.parent().expect("parent")).expect("mkdir");
        std::fs::create_dir_all(path_link.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path_exe, "").expect("write exe");
        symlink(&path_exe, &path_link).expect("symlink");

        let path_dir_anchor = derive_anchor_dir(None, move || Ok(path_link)).expect("anchor");
        let path_dir_expected = std::fs::canonicalize(tmp.path().join("install")).expect("canon");
        assert_eq!(path_dir_anchor, path_dir_expected);
    }

    #[test]
    fn unknown_executable_is_anchor_error() {
        let err = derive_anchor_dir(None, || Err(io::Error::from(io::ErrorKind::Unsupported)))
            .expect_err("must fail");
        assert!(matches!(err, FixupError::AnchorUnresolved { .. }));

        let err = derive_anchor_dir(None, || Ok(PathBuf::from("/definitely/not/here/dds-fixup")))
            .expect_err("must fail");
        assert!(matches!(err, FixupError::AnchorUnresolved { .. }));
    }
}
