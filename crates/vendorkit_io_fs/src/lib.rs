//! `vendorkit_io_fs` v1:
//! Rust-side filesystem kernel for vendored-tree maintenance.
//!
//! Modules:
//! - `copy`   : traversal and copy orchestration
//! - `remove` : recursive removal with a missing-target policy
//! - `spec`   : enums/options/errors
//! - `report` : run-time report models
//! - `util`   : shared helper functions

pub mod copy;
pub mod remove;
pub mod report;
pub mod spec;
mod util;

pub use copy::copy_tree;
pub use remove::remove_tree;
pub use report::{ReportCopy, ReportCopyBuilder, ReportRemove};
pub use spec::{
    CopyTreeError, EnumCopySymlinkStrategy, EnumRemoveMissingStrategy, RemoveTreeError,
    SpecCopyError, SpecCopyOptions,
};
