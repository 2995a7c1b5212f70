//! `dds-fixup`: refresh `src/` and `include/` next to this executable from the
//! vendored `asio/` tree, then drop its examples, tests and docs.

use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use vendorkit_fixup::conf::C_BIN_NAME;
use vendorkit_fixup::{
    EnumFixupErrorKind, FixupError, ReportNormalize, SpecFixupPaths, SpecNormalizeLayout,
    normalize,
};
use vendorkit_log::C_LOG_DIRECTIVE_DEFAULT;

/// Application exit codes
#[repr(u8)]
enum Exit {
    Success = 0,
    IoError = 1,
    UsageError = 2,
    NotFound = 3,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

impl From<EnumFixupErrorKind> for Exit {
    fn from(kind: EnumFixupErrorKind) -> Self {
        match kind {
            EnumFixupErrorKind::NotFound => Exit::NotFound,
            EnumFixupErrorKind::Io => Exit::IoError,
        }
    }
}

/// Copy asio/src and asio/include next to this executable, then remove
/// src/examples, src/tests and src/doc from the copy.
///
/// Existing src/ and include/ beside the executable are deleted first.
/// Set DDS_FIXUP_ROOT to use another directory as anchor, RUST_LOG to
/// adjust log output.
#[derive(Debug, Parser)]
#[command(name = C_BIN_NAME, disable_version_flag = true)]
struct Cli {}

fn main() -> ExitCode {
    if let Err(e) = Cli::try_parse() {
        let _ = e.print();
        return if e.use_stderr() {
            Exit::UsageError.into()
        } else {
            Exit::Success.into()
        };
    }

    if let Err(e) = vendorkit_log::init_tracing(C_LOG_DIRECTIVE_DEFAULT) {
        eprintln!("{C_BIN_NAME}: warning: logging disabled: {e}");
    }

    match run() {
        Ok(report_norm) => {
            info!("{report_norm}");
            Exit::Success.into()
        }
        Err(e) => {
            eprintln!("{C_BIN_NAME}: error: {e}");
            Exit::from(e.kind()).into()
        }
    }
}

fn run() -> Result<ReportNormalize, FixupError> {
    let spec_paths = SpecFixupPaths::resolve()?;
    info!(
        source = %spec_paths.path_dir_source_root.display(),
        destination = %spec_paths.path_dir_dest_root.display(),
        "normalizing vendored tree"
    );
    normalize(&spec_paths, &SpecNormalizeLayout::default())
}
