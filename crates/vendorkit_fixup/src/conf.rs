//! Fixed layout constants and environment keys.

/// Binary name, used as the prefix of error lines.
pub const C_BIN_NAME: &str = "dds-fixup";

/// Vendored library directory, relative to the anchor directory.
pub const C_DIR_VENDOR: &str = "asio";
/// Trees copied from the vendored library into the anchor directory, in order.
pub const TUP_TREES_REPLACED: [&str; 2] = ["src", "include"];
/// Copied tree from which [`TUP_DIRS_PRUNED`] are removed.
pub const C_TREE_PRUNED: &str = "src";
/// Subdirectories of [`C_TREE_PRUNED`] removed after the copy, in order.
pub const TUP_DIRS_PRUNED: [&str; 3] = ["examples", "tests", "doc"];

/// When set and non-empty, replaces the executable's directory as anchor.
pub const C_ENV_ROOT_OVERRIDE: &str = "DDS_FIXUP_ROOT";
