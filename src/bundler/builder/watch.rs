//! Source tree change detection for watch mode.
//!
//! The tree is fingerprinted by path, size and modification time; a changed
//! fingerprint triggers the next pipeline pass.

use crate::bundler::error::Result;
use crate::bundler::utils::fs::is_dependency_dir;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Snapshot of a source tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fingerprint {
    entries: Vec<(PathBuf, u64, Option<SystemTime>)>,
}

impl Fingerprint {
    /// Walks `root`, skipping dependency-manager directories.
    pub fn capture(root: &Path) -> Result<Self> {
        let walker = walkdir::WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_dependency_dir(e.file_name()));

        let mut entries = Vec::new();
        for entry in walker {
            // Editors save through short-lived temp files that can vanish mid-walk.
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if vanished(&e) => continue,
                Err(e) => return Err(e.into()),
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) if vanished(&e) => continue,
                Err(e) => return Err(e.into()),
            };
            entries.push((
                entry.path().to_path_buf(),
                metadata.len(),
                metadata.modified().ok(),
            ));
        }
        Ok(Self { entries })
    }

    /// Most recent modification time in the tree.
    pub fn newest(&self) -> Option<SystemTime> {
        self.entries.iter().filter_map(|(_, _, m)| *m).max()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Polls a source tree until it changes.
#[derive(Debug)]
pub struct SourceWatcher {
    root: PathBuf,
    interval: Duration,
    last: Fingerprint,
}

impl SourceWatcher {
    /// Starts watching from the tree's current state.
    pub async fn new(root: PathBuf, interval: Duration) -> Result<Self> {
        let last = capture_blocking(root.clone()).await?;
        log::debug!("Watching {} file(s) under {}", last.len(), root.display());
        Ok(Self {
            root,
            interval,
            last,
        })
    }

    /// Resolves once the tree differs from the last seen state.
    pub async fn changed(&mut self) -> Result<()> {
        loop {
            tokio::time::sleep(self.interval).await;
            let current = capture_blocking(self.root.clone()).await?;
            if current != self.last {
                if let Some(newest) = current.newest() {
                    let at: DateTime<Local> = newest.into();
                    log::info!(
                        "Change detected in {} (modified {})",
                        self.root.display(),
                        at.format("%H:%M:%S")
                    );
                }
                self.last = current;
                return Ok(());
            }
        }
    }
}

fn vanished(error: &walkdir::Error) -> bool {
    error
        .io_error()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

async fn capture_blocking(root: PathBuf) -> Result<Fingerprint> {
    tokio::task::spawn_blocking(move || Fingerprint::capture(&root))
        .await
        .map_err(|e| {
            crate::bundler::Error::GenericError(format!("Source scan task panicked: {}", e))
        })?
}
