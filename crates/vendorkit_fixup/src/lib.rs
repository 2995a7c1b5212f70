//! `vendorkit_fixup` v1:
//! replaces a project's `src`/`include` with a pruned copy of its vendored
//! asio tree.
//!
//! Modules:
//! - `conf`      : fixed names and environment keys
//! - `spec`      : layout/path models and pipeline steps
//! - `paths`     : anchor directory resolution
//! - `normalize` : the pipeline
//! - `report`    : per-run report
//! - `error`     : two-kind error taxonomy

pub mod conf;
pub mod error;
pub mod normalize;
pub mod paths;
pub mod report;
pub mod spec;

pub use error::{EnumFixupErrorKind, FixupError};
pub use normalize::normalize;
pub use paths::resolve_anchor_dir;
pub use report::ReportNormalize;
pub use spec::{EnumFixupStep, SpecFixupPaths, SpecNormalizeLayout};
