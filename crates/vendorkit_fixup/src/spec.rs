//! Layout and path models for one normalization run.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::conf::{C_DIR_VENDOR, C_TREE_PRUNED, TUP_DIRS_PRUNED, TUP_TREES_REPLACED};
use crate::error::FixupError;

/// Pipeline stage, carried by errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFixupStep {
    /// Tolerant removal of a destination tree.
    Remove,
    /// Copy of a vendored tree into the destination.
    Copy,
    /// Strict removal of a subdirectory from the copied tree.
    Prune,
}

impl fmt::Display for EnumFixupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c_step = match self {
            Self::Remove => "remove",
            Self::Copy => "copy",
            Self::Prune => "prune",
        };
        f.write_str(c_step)
    }
}

/// Directory names that drive the pipeline.
///
/// Every name is a single path component relative to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecNormalizeLayout {
    /// Trees removed from the destination and recopied from the source.
    pub trees_replaced: Vec<String>,
    /// Destination tree the pruned directories live in.
    pub tree_pruned: String,
    /// Directories deleted from `tree_pruned`; each must exist after the copy.
    pub dirs_pruned: Vec<String>,
}

impl Default for SpecNormalizeLayout {
    fn default() -> Self {
        Self {
            trees_replaced: TUP_TREES_REPLACED.iter().map(|v| v.to_string()).collect(),
            tree_pruned: C_TREE_PRUNED.to_string(),
            dirs_pruned: TUP_DIRS_PRUNED.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl SpecNormalizeLayout {
    /// Reject names that are empty or would leave their root (`..`, `a/b`, `/x`).
    pub fn validate(&self) -> Result<(), FixupError> {
        let iter_names = self
            .trees_replaced
            .iter()
            .chain(std::iter::once(&self.tree_pruned))
            .chain(self.dirs_pruned.iter());
        for name in iter_names {
            let mut iter_components = Path::new(name).components();
            let b_is_single_normal = matches!(iter_components.next(), Some(Component::Normal(_)))
                && iter_components.next().is_none();
            if !b_is_single_normal {
                return Err(FixupError::InvalidLayout { name: name.clone() });
            }
        }
        Ok(())
    }
}

/// Source and destination roots of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFixupPaths {
    /// Directory holding the vendored `src`/`include` layout.
    pub path_dir_source_root: PathBuf,
    /// Directory receiving the pruned copy.
    pub path_dir_dest_root: PathBuf,
}

impl SpecFixupPaths {
    /// Explicit roots.
    pub fn new<P, Q>(dir_source_root: P, dir_dest_root: Q) -> Self
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
    {
        Self {
            path_dir_source_root: dir_source_root.into(),
            path_dir_dest_root: dir_dest_root.into(),
        }
    }

    /// `<anchor>/asio` into `<anchor>`.
    pub fn from_anchor(dir_anchor: &Path) -> Self {
        Self::new(dir_anchor.join(C_DIR_VENDOR), dir_anchor)
    }

    /// Roots anchored at the running executable (see [`crate::paths`]).
    pub fn resolve() -> Result<Self, FixupError> {
        let path_dir_anchor = crate::paths::resolve_anchor_dir()?;
        Ok(Self::from_anchor(&path_dir_anchor))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{SpecFixupPaths, SpecNormalizeLayout};
    use crate::error::FixupError;

    #[test]
    fn default_layout_is_asio_shape() {
        let spec_layout = SpecNormalizeLayout::default();
        assert_eq!(spec_layout.trees_replaced, ["src", "include"]);
        assert_eq!(spec_layout.tree_pruned, "src");
        assert_eq!(spec_layout.dirs_pruned, ["examples", "tests", "doc"]);
        spec_layout.validate().expect("default layout is valid");
    }

    #[test]
    fn layout_rejects_escaping_names() {
        for name in ["..", "a/b", "/abs", "", "."] {
            let spec_layout = SpecNormalizeLayout {
                dirs_pruned: vec![name.to_string()],
                ..SpecNormalizeLayout::default()
            };
            let err = spec_layout.validate().expect_err("must reject");
            assert!(matches!(err, FixupError::InvalidLayout { .. }), "{name}");
        }
    }

    #[test]
    fn paths_from_anchor_place_vendor_under_anchor() {
        let spec_paths = SpecFixupPaths::from_anchor(Path::new("/opt/dds"));
        assert_eq!(spec_paths.path_dir_source_root, Path::new("/opt/dds/asio"));
        assert_eq!(spec_paths.path_dir_dest_root, Path::new("/opt/dds"));
    }
}
