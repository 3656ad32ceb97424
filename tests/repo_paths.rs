use std::fs;
use std::path::PathBuf;

use buildhelp::{chroot_path_under, find_repo_dir, reinterpret_path_for_user, Error};
use tempfile::TempDir;

/// Lay out `<tmp>/src/.repo` plus a nested checkout directory.
fn checkout() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("create tempdir");
    let root = tmp.path().join("src");
    fs::create_dir_all(root.join(".repo")).unwrap();
    fs::create_dir_all(root.join("platform/dev/host")).unwrap();
    (tmp, root)
}

#[test]
fn finds_marker_from_nested_directory() {
    let (_tmp, root) = checkout();
    let found = find_repo_dir(Some(&root.join("platform/dev/host"))).unwrap();
    assert_eq!(found, Some(root));
}

#[test]
fn finds_marker_in_start_directory() {
    let (_tmp, root) = checkout();
    assert_eq!(find_repo_dir(Some(&root)).unwrap(), Some(root));
}

#[test]
fn nearest_marker_wins() {
    let (_tmp, root) = checkout();
    let inner = root.join("platform");
    fs::create_dir(inner.join(".repo")).unwrap();
    let found = find_repo_dir(Some(&inner.join("dev/host"))).unwrap();
    assert_eq!(found, Some(inner));
}

#[test]
fn marker_must_be_a_directory() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".repo"), "not a dir").unwrap();
    let found = find_repo_dir(Some(tmp.path())).unwrap();
    assert_ne!(found.as_deref(), Some(tmp.path()));
}

#[test]
fn reinterprets_nested_path() {
    let (_tmp, root) = checkout();
    let mapped = reinterpret_path_for_user(root.join("platform/dev"), "builder").unwrap();
    assert_eq!(mapped, PathBuf::from("/home/builder/trunk/platform/dev"));
}

#[test]
fn reinterprets_path_with_dot_segments() {
    let (_tmp, root) = checkout();
    let mapped =
        reinterpret_path_for_user(root.join("platform/dev/host/../.."), "builder").unwrap();
    assert_eq!(mapped, PathBuf::from("/home/builder/trunk/platform"));
}

#[test]
fn path_outside_root_is_rejected() {
    let (tmp, root) = checkout();
    let outside = tmp.path().join("elsewhere");
    let err = chroot_path_under(&root, &outside, "builder").unwrap_err();
    assert!(matches!(err, Error::OutsideSourceTree { .. }));
}

#[test]
fn path_without_checkout_is_rejected() {
    let tmp = TempDir::new().unwrap();
    // Only meaningful when nothing above the temp dir is a checkout.
    if find_repo_dir(Some(tmp.path())).unwrap().is_some() {
        return;
    }
    let err = reinterpret_path_for_user(tmp.path(), "builder").unwrap_err();
    assert!(matches!(err, Error::RepoNotFound { .. }));
}
