//! Error taxonomy of the normalizer.
//!
//! Every failure is one of two kinds: something expected is missing
//! ([`EnumFixupErrorKind::NotFound`]) or the OS refused an operation
//! ([`EnumFixupErrorKind::Io`]).

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use vendorkit_io_fs::{CopyTreeError, RemoveTreeError, SpecCopyError};

use crate::spec::EnumFixupStep;

/// Coarse classification used for exit statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFixupErrorKind {
    /// A source tree or a pruned directory is absent.
    NotFound,
    /// Permission, disk, conflicting destination or any other OS failure.
    Io,
}

/// Normalizer failure. No step is rolled back when one is returned.
#[derive(Debug, Error)]
pub enum FixupError {
    /// An expected directory does not exist.
    #[error("{step}: no such directory: {}", .path.display())]
    NotFound {
        /// Step that expected the directory.
        step: EnumFixupStep,
        /// Missing directory.
        path: PathBuf,
    },
    /// OS failure on a path.
    #[error("{step}: {}: {source}", .path.display())]
    Io {
        /// Step that was running.
        step: EnumFixupStep,
        /// Path being processed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Filesystem state forbids the step (existing destination, file where a
    /// directory is expected, overlapping trees).
    #[error("{step}: {message}")]
    Refused {
        /// Step that refused to run.
        step: EnumFixupStep,
        /// Path the refusal is about.
        path: PathBuf,
        /// User-facing reason.
        message: String,
    },
    /// The tree copy finished with per-entry failures.
    #[error(
        "copy: {} entries failed under {} (first: {})",
        .errors.len(),
        .path.display(),
        format_first_copy_error(.errors)
    )]
    CopyIncomplete {
        /// Destination tree root.
        path: PathBuf,
        /// Collected failures, never empty.
        errors: Vec<SpecCopyError>,
    },
    /// A layout name is not a single relative path component.
    #[error("invalid layout entry `{name}`: must be a single directory name")]
    InvalidLayout {
        /// Offending name.
        name: String,
    },
    /// The anchor directory (own executable location) cannot be determined.
    #[error("cannot resolve anchor directory: {source}")]
    AnchorUnresolved {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

fn format_first_copy_error(errors: &[SpecCopyError]) -> String {
    errors
        .first()
        .map(|spec_error| format!("{}: {}", spec_error.path.display(), spec_error.exception))
        .unwrap_or_default()
}

impl FixupError {
    /// Two-kind classification.
    pub fn kind(&self) -> EnumFixupErrorKind {
        match self {
            Self::NotFound { .. } => EnumFixupErrorKind::NotFound,
            Self::Io { .. }
            | Self::Refused { .. }
            | Self::CopyIncomplete { .. }
            | Self::InvalidLayout { .. }
            | Self::AnchorUnresolved { .. } => EnumFixupErrorKind::Io,
        }
    }

    /// Classify a tree copy setup failure.
    pub fn from_copy(step: EnumFixupStep, exception: CopyTreeError) -> Self {
        let message = exception.to_string();
        match exception {
            CopyTreeError::SourceNotFound(path) => Self::NotFound { step, path },
            CopyTreeError::SourceInspectFailed { path, source }
            | CopyTreeError::DestinationInitFailed { path, source } => {
                Self::Io { step, path, source }
            }
            CopyTreeError::SourceNotDirectory(path) | CopyTreeError::DestinationExists(path) => {
                Self::Refused {
                    step,
                    path,
                    message,
                }
            }
            CopyTreeError::SourceDestinationOverlap {
                path_destination, ..
            } => Self::Refused {
                step,
                path: path_destination,
                message,
            },
            CopyTreeError::InvalidPattern { .. } => Self::Refused {
                step,
                path: PathBuf::new(),
                message,
            },
        }
    }

    /// Classify a tree removal failure.
    pub fn from_remove(step: EnumFixupStep, exception: RemoveTreeError) -> Self {
        let message = exception.to_string();
        match exception {
            RemoveTreeError::NotFound(path) => Self::NotFound { step, path },
            RemoveTreeError::NotDirectory(path) => Self::Refused {
                step,
                path,
                message,
            },
            RemoveTreeError::Io { path, source } => Self::Io { step, path, source },
        }
    }
}
