//! File system utilities for packaging.
//!
//! Provides idempotent directory operations, filtered tree copies and
//! artifact writes with checksum reporting.

use crate::bundler::error::{Error, ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::{
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Directory names owned by package managers; never copied into releases.
pub const DEPENDENCY_DIRS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Whether `name` is a dependency-manager directory.
pub fn is_dependency_dir(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| DEPENDENCY_DIRS.contains(&n))
}

/// Creates the given directory and its parents, succeeding if it exists.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Leaves `path` as an existing, empty directory.
///
/// Existing contents are removed entry by entry so the directory itself (and
/// any handle on it) survives.
pub async fn empty_or_create_dir(path: &Path) -> Result<()> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return ensure_dir(path).await;
    }

    let mut entries = fs::read_dir(path)
        .await
        .fs_context("reading directory to empty", path)?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading directory to empty", path)?
    {
        let entry_path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .fs_context("reading entry type", &entry_path)?;
        if file_type.is_dir() {
            fs::remove_dir_all(&entry_path)
                .await
                .fs_context("removing directory", &entry_path)?;
        } else {
            fs::remove_file(&entry_path)
                .await
                .fs_context("removing file", &entry_path)?;
        }
    }
    Ok(())
}

/// Removes a file. Returns `Ok(false)` if there was nothing to remove.
pub async fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Writes `contents` to `path`, creating parent directories as needed.
///
/// Returns the SHA-256 of what was written.
pub async fn write_artifact(path: &Path, contents: &str) -> Result<String> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }
    fs::write(path, contents)
        .await
        .fs_context("writing artifact", path)?;
    Ok(sha256_hex(contents.as_bytes()))
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Recursively copies a directory, skipping dependency-manager directories.
///
/// Symlinks are copied as the files or directories they point to.
/// Fails if the source path is not a directory.
pub async fn copy_dir_filtered(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        crate::bail!("{} is not a directory", from.display());
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    // Offload blocking work to dedicated thread pool
    tokio::task::spawn_blocking(move || copy_tree(&from, &to))
        .await
        .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {}", e)))?
}

fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    std::fs::create_dir_all(to).fs_context("creating directory", to)?;

    let walker = walkdir::WalkDir::new(from)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_dependency_dir(e.file_name()));

    let mut copied = 0;
    for entry in walker {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path: PathBuf = to.join(rel_path);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
        } else {
            std::fs::copy(entry.path(), &dest_path).fs_context("copying file", entry.path())?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_or_create_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("release");

        empty_or_create_dir(&dir).await.unwrap();
        assert!(dir.is_dir());

        std::fs::write(dir.join("old.txt"), "old").unwrap();
        std::fs::create_dir_all(dir.join("src/nested")).unwrap();
        std::fs::write(dir.join("src/nested/file.js"), "x").unwrap();

        empty_or_create_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_remove_file_if_exists() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("a.plugin.js");
        assert!(!remove_file_if_exists(&file).await.unwrap());
        std::fs::write(&file, "x").unwrap();
        assert!(remove_file_if_exists(&file).await.unwrap());
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_copy_skips_dependency_dirs() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("addon");
        std::fs::create_dir_all(src.join("node_modules/dep")).unwrap();
        std::fs::create_dir_all(src.join("lib/node_modules")).unwrap();
        std::fs::write(src.join("index.js"), "main").unwrap();
        std::fs::write(src.join("lib/util.js"), "util").unwrap();
        std::fs::write(src.join("node_modules/dep/index.js"), "dep").unwrap();
        std::fs::write(src.join("lib/node_modules/x.js"), "x").unwrap();

        let dest = root.path().join("out/src");
        let copied = copy_dir_filtered(&src, &dest).await.unwrap();

        assert_eq!(copied, 2);
        assert_eq!(std::fs::read_to_string(dest.join("index.js")).unwrap(), "main");
        assert!(dest.join("lib/util.js").exists());
        assert!(!dest.join("node_modules").exists());
        assert!(!dest.join("lib/node_modules").exists());
    }

    #[tokio::test]
    async fn test_copy_requires_directory() {
        let root = tempfile::tempdir().unwrap();
        assert!(copy_dir_filtered(&root.path().join("missing"), root.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_write_artifact_checksum() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("nested/out.plugin.js");
        let sum = write_artifact(&path, "abc").await.unwrap();
        assert_eq!(
            sum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(std::fs::read_to_string(path).unwrap(), "abc");
    }
}
