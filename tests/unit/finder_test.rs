//! Tests for the artifact finder

use std::fs;
use std::path::PathBuf;

use gradle_runner::core::models::PatternSet;
use gradle_runner::finder::{ArtifactFinder, FindError, PathConvention};
use test_case::test_case;

use crate::common::TestTree;

fn find_sorted(tree: &TestTree, finder: ArtifactFinder, patterns: &PatternSet) -> Vec<PathBuf> {
    let mut found = finder.find(tree.path(), patterns).unwrap();
    found.sort();
    found
}

fn expected(tree: &TestTree, paths: &[&str]) -> Vec<PathBuf> {
    let mut want: Vec<PathBuf> = paths.iter().map(|p| tree.join(p)).collect();
    want.sort();
    want
}

// =============================================================================
// Include / Exclude Table
// =============================================================================

#[test_case(&["*.apk"], &[], &["test.apk"], &["test.apk"] ; "one include no exclude")]
#[test_case(&["*.apk"], &["*.aab"], &["test.apk", "test.aab"], &["test.apk"] ; "one include one exclude")]
#[test_case(&["*.apk"], &[], &["a/test.apk"], &["a/test.apk"] ; "nested")]
#[test_case(
    &["*.apk"], &["unaligned*.apk"],
    &["a/test.apk", "a/unaligned-test.apk"],
    &["a/test.apk", "a/unaligned-test.apk"]
    ; "exclude anchored at start does not match nested"
)]
#[test_case(
    &["*.apk"], &["*unaligned*.apk"],
    &["a/test.apk", "a/unaligned-test.apk"],
    &["a/test.apk"]
    ; "nested exclude"
)]
#[test_case(
    &["*.apk"], &["*unaligned*.apk", "*Test*.apk"],
    &["a/test.apk", "a/unaligned-test.apk", "a/Test-app.apk"],
    &["a/test.apk"]
    ; "two excludes"
)]
#[test_case(
    &["*/b/*.apk"], &["*unaligned*.apk", "*Test*.apk"],
    &["a/b/test.apk", "a/b/unaligned-test.apk", "a/b/Test-app.apk"],
    &["a/b/test.apk"]
    ; "directory in include"
)]
#[test_case(
    &["*/b/*.apk"], &["*/c/*"],
    &["a/b/test.apk", "a/c/unaligned-test.apk", "a/c/Test-app.apk"],
    &["a/b/test.apk"]
    ; "directory in include and exclude"
)]
fn test_find_table(include: &[&str], exclude: &[&str], files: &[&str], want: &[&str]) {
    let tree = TestTree::with_files(files);
    let patterns = PatternSet::new(include.iter(), exclude.iter());

    let found = find_sorted(&tree, ArtifactFinder::default(), &patterns);

    assert_eq!(found, expected(&tree, want));
}

// =============================================================================
// Behavior
// =============================================================================

#[test]
fn test_directories_are_never_returned() {
    let tree = TestTree::new();
    tree.add_dir("outputs/weird.apk");
    tree.add_file("outputs/real.apk", "");

    let found = find_sorted(&tree, ArtifactFinder::default(), &PatternSet::new(["*.apk"], [""; 0]));

    assert_eq!(found, expected(&tree, &["outputs/real.apk"]));
}

#[test]
fn test_empty_include_returns_nothing() {
    let tree = TestTree::with_files(&["app.apk"]);
    let patterns = PatternSet::new(Vec::<String>::new(), ["*.txt"]);

    let found = ArtifactFinder::default().find(tree.path(), &patterns).unwrap();

    assert!(found.is_empty());
}

#[test]
fn test_no_match_is_not_an_error() {
    let tree = TestTree::with_files(&["README.md"]);
    let found = ArtifactFinder::default()
        .find(tree.path(), &PatternSet::from_lines("*.apk", ""))
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_hidden_files_are_candidates() {
    let tree = TestTree::with_files(&[".cache/app.apk"]);
    let found = find_sorted(&tree, ArtifactFinder::default(), &PatternSet::from_lines("*.apk", ""));
    assert_eq!(found, expected(&tree, &[".cache/app.apk"]));
}

#[test]
fn test_relative_convention_matches_from_root() {
    let tree = TestTree::with_files(&["mapping.txt", "app/mapping.txt"]);
    let patterns = PatternSet::from_lines("*/mapping.txt", "");

    let found = find_sorted(&tree, ArtifactFinder::new(PathConvention::Relative), &patterns);

    assert_eq!(found, expected(&tree, &["app/mapping.txt"]));
}

#[test]
fn test_absolute_convention_sees_root_components() {
    let tree = TestTree::with_files(&["mapping.txt", "app/mapping.txt"]);
    let patterns = PatternSet::from_lines("*/mapping.txt", "");

    let found = find_sorted(&tree, ArtifactFinder::new(PathConvention::Absolute), &patterns);

    assert_eq!(found, expected(&tree, &["mapping.txt", "app/mapping.txt"]));
}

#[test]
fn test_absolute_convention_can_anchor_on_root() {
    let tree = TestTree::with_files(&["out/app.apk", "other/app.apk"]);
    let root = tree.path().to_string_lossy().replace('\\', "/");
    let patterns = PatternSet::new([format!("{root}/out/*")], [""; 0]);

    let found = find_sorted(&tree, ArtifactFinder::new(PathConvention::Absolute), &patterns);

    assert_eq!(found, expected(&tree, &["out/app.apk"]));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_missing_root() {
    let tree = TestTree::new();
    let missing = tree.join("does-not-exist");

    let err = ArtifactFinder::default()
        .find(&missing, &PatternSet::from_lines("*", ""))
        .unwrap_err();

    assert!(matches!(err, FindError::RootNotFound(path) if path == missing));
}

#[test]
fn test_root_is_a_file() {
    let tree = TestTree::new();
    let file = tree.add_file("app.apk", "");

    let err = ArtifactFinder::default()
        .find(&file, &PatternSet::from_lines("*", ""))
        .unwrap_err();

    assert!(matches!(err, FindError::NotADirectory(_)));
}

#[test]
fn test_missing_root_reported_even_without_includes() {
    let tree = TestTree::new();
    let err = ArtifactFinder::default()
        .find(tree.join("nope"), &PatternSet::default())
        .unwrap_err();
    assert!(matches!(err, FindError::RootNotFound(_)));
}

#[test]
fn test_invalid_pattern_is_an_error() {
    let tree = TestTree::with_files(&["app.apk"]);
    let err = ArtifactFinder::default()
        .find(tree.path(), &PatternSet::from_lines("***.apk", ""))
        .unwrap_err();
    assert!(matches!(err, FindError::InvalidPattern(_)));
    assert!(err.to_string().contains("***.apk"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_aborts_walk() {
    let tree = TestTree::with_files(&["a/app.apk", "locked/inner.apk"]);
    tree.set_mode("locked", 0o000);
    if fs::read_dir(tree.join("locked")).is_ok() {
        // permission bits do not apply to root
        tree.set_mode("locked", 0o755);
        return;
    }

    let result = ArtifactFinder::default().find(tree.path(), &PatternSet::from_lines("*.apk", ""));
    tree.set_mode("locked", 0o755);

    match result {
        Err(FindError::Walk { path, .. }) => assert_eq!(path, tree.join("locked")),
        other => panic!("expected a walk error, got {other:?}"),
    }
}

// =============================================================================
// Symlinks
// =============================================================================

#[cfg(unix)]
#[test]
fn test_symlink_to_directory_is_not_a_match() {
    let tree = TestTree::new();
    tree.add_dir("real/release.apk");
    tree.add_symlink("link.apk", "real/release.apk");

    let found = find_sorted(&tree, ArtifactFinder::default(), &PatternSet::from_lines("*.apk", ""));

    assert!(found.is_empty(), "got {found:?}");
}

#[cfg(unix)]
#[test]
fn test_symlink_to_file_is_a_match() {
    let tree = TestTree::with_files(&["real/app.txt"]);
    tree.add_symlink("link.apk", "real/app.txt");

    let found = find_sorted(&tree, ArtifactFinder::default(), &PatternSet::from_lines("*.apk", ""));

    assert_eq!(found, expected(&tree, &["link.apk"]));
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_is_skipped() {
    let tree = TestTree::with_files(&["out/app.apk"]);
    tree.add_symlink("broken.apk", "missing.apk");

    let found = find_sorted(&tree, ArtifactFinder::default(), &PatternSet::from_lines("*.apk", ""));

    assert_eq!(found, expected(&tree, &["out/app.apk"]));
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_packages_and_bundles() {
    let tree = TestTree::with_files(&["app-release.apk", "app-debug-unaligned.apk", "app.aab", "README.md"]);

    let found = find_sorted(&tree, ArtifactFinder::default(), &PatternSet::from_lines("*.apk\n*.aab", ""));

    assert_eq!(
        found,
        expected(&tree, &["app-release.apk", "app-debug-unaligned.apk", "app.aab"])
    );
}

#[test]
fn test_unaligned_excluded() {
    let tree = TestTree::with_files(&["app-release.apk", "app-debug-unaligned.apk"]);

    let found = find_sorted(
        &tree,
        ArtifactFinder::default(),
        &PatternSet::from_lines("*.apk", "*unaligned*.apk"),
    );

    assert_eq!(found, expected(&tree, &["app-release.apk"]));
}

#[test]
fn test_match_reported_once_for_several_includes() {
    let tree = TestTree::with_files(&["out/app.apk"]);
    let patterns = PatternSet::from_lines("*.apk\n*/app.apk\nout/*", "");

    let found = find_sorted(&tree, ArtifactFinder::default(), &patterns);

    assert_eq!(found, expected(&tree, &["out/app.apk"]));
}

#[test]
fn test_find_is_idempotent() {
    let tree = TestTree::with_files(&["a/x.apk", "b/y.apk", "c/z.aab", "d/notes.txt"]);
    let patterns = PatternSet::from_lines("*.apk\n*.aab", "");
    let finder = ArtifactFinder::default();

    assert_eq!(find_sorted(&tree, finder, &patterns), find_sorted(&tree, finder, &patterns));
}
