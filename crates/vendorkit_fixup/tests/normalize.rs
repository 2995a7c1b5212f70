//! End-to-end behavior of the normalization pipeline on real directory trees.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vendorkit_fixup::{
    EnumFixupErrorKind, EnumFixupStep, FixupError, SpecFixupPaths, SpecNormalizeLayout, normalize,
};

fn write_text(path: &Path, txt: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, txt).expect("write text");
}

/// Relative path -> bytes for every file below `root`.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, path_dir: &Path, dict_files: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(path_dir).expect("read dir") {
            let path_entry = entry.expect("entry").path();
            if path_entry.is_dir() {
                walk(root, &path_entry, dict_files);
            } else {
                let path_rel = path_entry.strip_prefix(root).expect("prefix").to_path_buf();
                dict_files.insert(path_rel, std::fs::read(&path_entry).expect("read file"));
            }
        }
    }
    let mut dict_files = BTreeMap::new();
    walk(root, root, &mut dict_files);
    dict_files
}

/// A vendored asio checkout next to the tool.
struct VendorFixture {
    tmp: TempDir,
}

impl VendorFixture {
    fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let asio = tmp.path().join("asio");
        write_text(&asio.join("src/asio.cpp"), "#include <asio/impl/src.hpp>\n");
        write_text(&asio.join("src/asio_ssl.cpp"), "#include <asio/ssl/impl/src.hpp>\n");
        write_text(&asio.join("src/Makefile.am"), "SUBDIRS = examples tests\n");
        write_text(&asio.join("src/examples/cpp11/echo/server.cpp"), "int main() {}\n");
        write_text(&asio.join("src/examples/cpp11/echo/client.cpp"), "int main() {}\n");
        write_text(&asio.join("src/tests/unit/io_context.cpp"), "// test\n");
        write_text(&asio.join("src/tests/latency/udp_server.cpp"), "// bench\n");
        write_text(&asio.join("src/doc/reference.qbk"), "[section:reference]\n");
        write_text(&asio.join("include/asio.hpp"), "#pragma once\n");
        write_text(&asio.join("include/asio/io_context.hpp"), "#pragma once\n");
        write_text(&asio.join("include/asio/impl/src.hpp"), "#pragma once\n");
        Self { tmp }
    }

    fn root(&self) -> &Path {
        self.tmp.path()
    }

    fn paths(&self) -> SpecFixupPaths {
        SpecFixupPaths::from_anchor(self.root())
    }

    fn run(&self) -> Result<vendorkit_fixup::ReportNormalize, FixupError> {
        normalize(&self.paths(), &SpecNormalizeLayout::default())
    }
}

#[test]
fn scenario_copies_sources_and_headers_without_extras() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    write_text(&root.join("asio/src/a.cpp"), "a");
    write_text(&root.join("asio/src/examples/e.cpp"), "e");
    write_text(&root.join("asio/src/tests/t.cpp"), "t");
    write_text(&root.join("asio/src/doc/d.md"), "d");
    write_text(&root.join("asio/include/lib.h"), "h");

    normalize(
        &SpecFixupPaths::from_anchor(root),
        &SpecNormalizeLayout::default(),
    )
    .expect("normalize");

    assert_eq!(std::fs::read_to_string(root.join("src/a.cpp")).expect("read"), "a");
    assert_eq!(std::fs::read_to_string(root.join("include/lib.h")).expect("read"), "h");
    assert!(!root.join("src/examples").exists());
    assert!(!root.join("src/tests").exists());
    assert!(!root.join("src/doc").exists());
}

#[test]
fn destination_matches_source_minus_pruned_dirs() {
    let fixture = VendorFixture::new();
    fixture.run().expect("normalize");

    let dict_src_expected: BTreeMap<_, _> = snapshot(&fixture.root().join("asio/src"))
        .into_iter()
        .filter(|(path_rel, _)| {
            !["examples", "tests", "doc"]
                .iter()
                .any(|name| path_rel.starts_with(name))
        })
        .collect();
    assert_eq!(snapshot(&fixture.root().join("src")), dict_src_expected);
    assert_eq!(
        snapshot(&fixture.root().join("include")),
        snapshot(&fixture.root().join("asio/include"))
    );
}

#[test]
fn pruned_dirs_are_gone_however_deep() {
    let fixture = VendorFixture::new();
    let path_deep = fixture
        .root()
        .join("asio/src/examples/a/b/c/d/e/f/g/h/deep.cpp");
    write_text(&path_deep, "deep");

    fixture.run().expect("normalize");

    for name in ["examples", "tests", "doc"] {
        assert!(!fixture.root().join("src").join(name).exists(), "{name}");
    }
    assert!(path_deep.exists());
}

#[test]
fn second_run_yields_identical_tree() {
    let fixture = VendorFixture::new();
    fixture.run().expect("first run");
    let dict_src_first = snapshot(&fixture.root().join("src"));
    let dict_inc_first = snapshot(&fixture.root().join("include"));

    let report_norm = fixture.run().expect("second run");
    assert!(
        report_norm
            .l_reports_removed
            .iter()
            .all(|report_rm| report_rm.if_existed)
    );
    assert_eq!(snapshot(&fixture.root().join("src")), dict_src_first);
    assert_eq!(snapshot(&fixture.root().join("include")), dict_inc_first);
}

#[test]
fn stale_destination_files_are_removed() {
    let fixture = VendorFixture::new();
    write_text(&fixture.root().join("src/old_generated.cpp"), "stale");
    write_text(&fixture.root().join("src/examples/leftover.cpp"), "stale");
    write_text(&fixture.root().join("include/asio/removed_upstream.hpp"), "stale");

    fixture.run().expect("normalize");

    assert!(!fixture.root().join("src/old_generated.cpp").exists());
    assert!(!fixture.root().join("src/examples").exists());
    assert!(!fixture.root().join("include/asio/removed_upstream.hpp").exists());
    assert!(fixture.root().join("include/asio/io_context.hpp").exists());
}

#[test]
fn source_trees_are_left_untouched() {
    let fixture = VendorFixture::new();
    let dict_vendor_before = snapshot(&fixture.root().join("asio"));

    fixture.run().expect("normalize");

    assert_eq!(snapshot(&fixture.root().join("asio")), dict_vendor_before);
}

#[test]
fn missing_source_src_fails_after_destination_cleanup() {
    let fixture = VendorFixture::new();
    write_text(&fixture.root().join("src/old.cpp"), "old");
    write_text(&fixture.root().join("include/old.h"), "old");
    std::fs::remove_dir_all(fixture.root().join("asio/src")).expect("drop vendored src");

    let err = fixture.run().expect_err("must fail");

    assert_eq!(err.kind(), EnumFixupErrorKind::NotFound);
    assert!(matches!(
        err,
        FixupError::NotFound {
            step: EnumFixupStep::Copy,
            ref path,
        } if path == &fixture.root().join("asio/src")
    ));
    assert!(!fixture.root().join("src").exists());
    assert!(!fixture.root().join("include").exists());
}

#[test]
fn missing_source_include_leaves_src_copied_but_unpruned() {
    let fixture = VendorFixture::new();
    std::fs::remove_dir_all(fixture.root().join("asio/include")).expect("drop headers");

    let err = fixture.run().expect_err("must fail");

    assert_eq!(err.kind(), EnumFixupErrorKind::NotFound);
    assert!(fixture.root().join("src/asio.cpp").exists());
    assert!(fixture.root().join("src/examples").exists());
    assert!(!fixture.root().join("include").exists());
}

#[test]
fn missing_pruned_dir_fails_without_rollback() {
    let fixture = VendorFixture::new();
    std::fs::remove_dir_all(fixture.root().join("asio/src/tests")).expect("drop tests");

    let err = fixture.run().expect_err("must fail");

    assert_eq!(err.kind(), EnumFixupErrorKind::NotFound);
    assert!(matches!(
        err,
        FixupError::NotFound {
            step: EnumFixupStep::Prune,
            ref path,
        } if path == &fixture.root().join("src/tests")
    ));
    // examples went before the failure, doc was never reached.
    assert!(!fixture.root().join("src/examples").exists());
    assert!(fixture.root().join("src/doc").exists());
    assert!(fixture.root().join("include/asio.hpp").exists());
}

#[test]
fn custom_layout_drives_the_same_pipeline() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    write_text(&root.join("vendor/lib/core.c"), "core");
    write_text(&root.join("vendor/lib/bench/b.c"), "bench");
    write_text(&root.join("out/lib/stale.c"), "stale");

    let spec_layout = SpecNormalizeLayout {
        trees_replaced: vec!["lib".to_string()],
        tree_pruned: "lib".to_string(),
        dirs_pruned: vec!["bench".to_string()],
    };
    let spec_paths = SpecFixupPaths::new(root.join("vendor"), root.join("out"));
    normalize(&spec_paths, &spec_layout).expect("normalize");

    assert!(root.join("out/lib/core.c").exists());
    assert!(!root.join("out/lib/bench").exists());
    assert!(!root.join("out/lib/stale.c").exists());
}

#[cfg(unix)]
#[test]
fn unreadable_source_file_makes_copy_incomplete() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = VendorFixture::new();
    let path_locked = fixture.root().join("asio/include/asio/io_context.hpp");
    std::fs::set_permissions(&path_locked, std::fs::Permissions::from_mode(0o000))
        .expect("lock file");
    // Root reads it anyway.
    let b_if_readable = std::fs::read(&path_locked).is_ok();

    let res = fixture.run();
    std::fs::set_permissions(&path_locked, std::fs::Permissions::from_mode(0o644))
        .expect("unlock file");

    if b_if_readable {
        res.expect("normalize");
        return;
    }
    let err = res.expect_err("must fail");
    assert_eq!(err.kind(), EnumFixupErrorKind::Io);
    assert!(matches!(err, FixupError::CopyIncomplete { ref errors, .. } if errors.len() == 1));
    // Pruning never ran.
    assert!(fixture.root().join("src/examples").exists());
}

#[cfg(unix)]
#[test]
fn aliased_source_directory_is_copied_under_both_names() {
    let fixture = VendorFixture::new();
    write_text(&fixture.root().join("asio/src/x_impl/real.cpp"), "impl");
    std::os::unix::fs::symlink("x_impl", fixture.root().join("asio/src/a_alias"))
        .expect("alias");

    let report_norm = fixture.run().expect("normalize");

    assert_eq!(report_norm.warning_count(), 0);
    assert_eq!(
        std::fs::read_to_string(fixture.root().join("src/a_alias/real.cpp")).expect("read"),
        "impl"
    );
    assert_eq!(
        std::fs::read_to_string(fixture.root().join("src/x_impl/real.cpp")).expect("read"),
        "impl"
    );
}

#[cfg(unix)]
#[test]
fn symlink_cycle_in_vendored_tree_fails_before_pruning() {
    let fixture = VendorFixture::new();
    let path_dir_src = fixture.root().join("asio/src");
    std::os::unix::fs::symlink(&path_dir_src, path_dir_src.join("self_ref")).expect("cycle");

    let err = fixture.run().expect_err("must fail");

    assert_eq!(err.kind(), EnumFixupErrorKind::Io);
    assert!(matches!(
        err,
        FixupError::CopyIncomplete { ref errors, .. }
            if errors.len() == 1 && errors[0].exception.contains("Symlink loop detected")
    ));
    assert!(fixture.root().join("src/examples").exists());
}
