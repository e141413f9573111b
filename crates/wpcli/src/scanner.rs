//! Installation discovery by directory walk.

use std::ffi::OsStr;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::types::Installation;

/// Find every directory under `root` that directly contains `marker_file`.
///
/// Hidden directories (a component starting with `.`, relative to `root`)
/// are not descended into, symlinked directories are not followed and
/// unreadable entries are skipped. A marker that is a symlink to a file
/// counts. The order is whatever the filesystem yields.
pub fn scan(root: &Path, marker_file: &str) -> Vec<Installation> {
    log::debug!("Scanning {} for {}", root.display(), marker_file);

    let marker = OsStr::new(marker_file);
    let installations: Vec<Installation> = visible_entries(root)
        .filter(|entry| entry.file_name() == marker && is_file(entry))
        .filter_map(|entry| entry.path().parent().map(Installation::new))
        .collect();

    if installations.is_empty() {
        log::warn!("No WordPress installations found under {}", root.display());
    } else {
        log::debug!(
            "Found {} installation(s) under {}",
            installations.len(),
            root.display()
        );
    }

    installations
}

/// Open a single installation, checking that the marker file is present.
pub fn open(directory: &Path, marker_file: &str) -> Result<Installation> {
    if directory.join(marker_file).is_file() {
        Ok(Installation::new(directory))
    } else {
        Err(Error::NotAnInstallation {
            path: directory.to_path_buf(),
            marker: marker_file.to_string(),
        })
    }
}

/// Walk `root`, skipping hidden directories below it.
pub(crate) fn visible_entries(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden_dir(entry))
        .filter_map(|e| e.ok())
}

/// A regular file, or a symlink resolving to one.
pub(crate) fn is_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const MARKER: &str = "wp-config.php";

    fn site(root: &Path, rel: &str) -> PathBuf {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MARKER), "<?php\n").unwrap();
        dir
    }

    fn found(root: &Path) -> BTreeSet<PathBuf> {
        scan(root, MARKER)
            .into_iter()
            .map(|i| i.directory)
            .collect()
    }

    #[test]
    fn test_scan_excludes_hidden_directories() {
        let tmp = TempDir::new().unwrap();
        let visible = site(tmp.path(), "sites/site");
        site(tmp.path(), ".cache/site");
        site(tmp.path(), "sites/.trash/old");

        assert_eq!(found(tmp.path()), BTreeSet::from([visible]));
    }

    #[test]
    fn test_scan_finds_nested_installations() {
        let tmp = TempDir::new().unwrap();
        let outer = site(tmp.path(), "www");
        let inner = site(tmp.path(), "www/blog");
        fs::create_dir_all(tmp.path().join("www/blog/wp-content/uploads")).unwrap();

        assert_eq!(found(tmp.path()), BTreeSet::from([outer, inner]));
    }

    #[test]
    fn test_scan_requires_marker_directly_in_directory() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("notes")).unwrap();
        fs::write(tmp.path().join("notes/wp-config.php.bak"), "").unwrap();
        // A directory named like the marker does not count
        fs::create_dir_all(tmp.path().join("odd/wp-config.php")).unwrap();

        assert!(found(tmp.path()).is_empty());
    }

    #[test]
    fn test_scan_root_itself_may_be_hidden() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join(".hidden-home");
        let visible = site(&root, "public_html");

        assert_eq!(found(&root), BTreeSet::from([visible]));
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(scan(&tmp.path().join("missing"), MARKER).is_empty());
    }

    #[test]
    fn test_scan_records_are_defaulted() {
        let tmp = TempDir::new().unwrap();
        site(tmp.path(), "blog");

        let installations = scan(tmp.path(), MARKER);
        assert_eq!(installations.len(), 1);
        assert_eq!(installations[0], Installation::new(tmp.path().join("blog")));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_accepts_symlinked_marker() {
        let tmp = TempDir::new().unwrap();
        let shared = tmp.path().join("shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("blog-config.php"), "<?php\n").unwrap();

        let blog = tmp.path().join("sites/blog");
        fs::create_dir_all(&blog).unwrap();
        std::os::unix::fs::symlink(shared.join("blog-config.php"), blog.join(MARKER)).unwrap();

        assert_eq!(found(tmp.path()), BTreeSet::from([blog.clone()]));
        assert_eq!(open(&blog, MARKER).unwrap().directory, blog);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_does_not_follow_directory_symlinks() {
        let tmp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        site(outside.path(), "elsewhere");
        std::os::unix::fs::symlink(outside.path(), tmp.path().join("link")).unwrap();

        // A dangling marker link is not a file either
        let broken = tmp.path().join("broken");
        fs::create_dir_all(&broken).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("missing.php"), broken.join(MARKER)).unwrap();

        assert!(found(tmp.path()).is_empty());
    }

    #[test]
    fn test_open() {
        let tmp = TempDir::new().unwrap();
        let dir = site(tmp.path(), "blog");

        assert_eq!(open(&dir, MARKER).unwrap().directory, dir);

        match open(tmp.path(), MARKER) {
            Err(Error::NotAnInstallation { path, marker }) => {
                assert_eq!(path, tmp.path());
                assert_eq!(marker, MARKER);
            }
            other => panic!("Expected NotAnInstallation error, got: {:?}", other),
        }
    }
}
