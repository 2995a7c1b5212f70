//! Copy/remove policy models and top-level error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Symlink handling policy for entries found inside the source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumCopySymlinkStrategy {
    /// Follow the link and copy the target bytes/entries.
    #[default]
    Dereference,
    /// Create a symbolic link at destination (do not copy target bytes).
    CopySymlinks,
    /// Ignore symlink entries.
    SkipSymlinks,
}

/// What `remove_tree` does when the target does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumRemoveMissingStrategy {
    /// A missing target is a successful no-op.
    Ignore,
    /// A missing target is [`RemoveTreeError::NotFound`].
    #[default]
    Error,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `copy_tree`.
#[derive(Debug, Clone)]
pub struct SpecCopyOptions {
    /// Glob patterns matched against entry basenames; matching files and
    /// directories are not copied.
    pub patterns_ignore: Option<Vec<String>>,
    /// Symlink handling behavior.
    pub rule_symlink: EnumCopySymlinkStrategy,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            patterns_ignore: None,
            rule_symlink: EnumCopySymlinkStrategy::Dereference,
        }
    }
}

/// One copy failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// "Top-level call failed" errors for `copy_tree` (validation / setup stage).
///
/// Nothing has been written to the destination when one of these is returned.
#[derive(Debug, Error)]
pub enum CopyTreeError {
    /// Source path does not exist.
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// Source path exists but is not a directory.
    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),
    /// Source metadata could not be read.
    #[error("Failed to inspect source {}: {source}", .path.display())]
    SourceInspectFailed {
        /// Source path that failed inspection.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Destination path already exists (file, directory or link).
    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),
    /// Invalid ignore pattern.
    #[error("Invalid ignore pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// Pattern as supplied by the caller.
        pattern: String,
        /// Parser error text.
        message: String,
    },
    /// Source and destination overlap (`src` contains `dst` or vice versa).
    #[error(
        "Source and destination directories overlap: {} <-> {}",
        .path_source.display(),
        .path_destination.display()
    )]
    SourceDestinationOverlap {
        /// Normalized source directory.
        path_source: PathBuf,
        /// Normalized destination directory.
        path_destination: PathBuf,
    },
    /// Destination directory initialization failed.
    #[error("Failed to initialize destination {}: {source}", .path.display())]
    DestinationInitFailed {
        /// Destination path that failed initialization.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// `remove_tree` failures. Removal stops at the first one.
#[derive(Debug, Error)]
pub enum RemoveTreeError {
    /// Target does not exist and the policy was [`EnumRemoveMissingStrategy::Error`].
    #[error("Directory not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Target exists but is a file or a symbolic link.
    #[error("Not a directory: {}", .0.display())]
    NotDirectory(PathBuf),
    /// OS failure while inspecting or deleting an entry.
    #[error("Failed to remove {}: {source}", .path.display())]
    Io {
        /// Entry being processed when the failure happened.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl RemoveTreeError {
    /// Path the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(path) | Self::NotDirectory(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
