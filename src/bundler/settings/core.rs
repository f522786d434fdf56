//! Immutable per-process build context.

use super::BuilderConfig;
use crate::metadata::AddonConfig;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Flags selected for this run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFlags {
    /// Build-only run: keep the previous artifact, optionally write a README.
    pub build: bool,
    /// Force a README next to the dev artifact.
    pub readme: bool,
    /// Produce a release directory.
    pub release: bool,
    /// Recompile on source changes.
    pub watch: bool,
}

/// Everything a pipeline pass reads, built once at startup.
///
/// Stages receive only the slices they need (addon config, templates,
/// paths); nothing here changes after construction.
#[derive(Debug, Clone)]
pub struct BuildContext {
    addon_dir: PathBuf,
    addon: AddonConfig,
    builder: BuilderConfig,
    flags: RunFlags,
    cwd: PathBuf,
    public_release_root: Option<PathBuf>,
    started: Instant,
}

impl BuildContext {
    pub fn new(
        addon_dir: PathBuf,
        addon: AddonConfig,
        builder: BuilderConfig,
        flags: RunFlags,
        cwd: PathBuf,
        public_release_root: Option<PathBuf>,
    ) -> Self {
        Self {
            addon_dir,
            addon,
            builder,
            flags,
            cwd,
            public_release_root,
            started: Instant::now(),
        }
    }

    /// Source directory of the selected addon; also the compiler entry.
    pub fn addon_dir(&self) -> &Path {
        &self.addon_dir
    }

    pub fn addon(&self) -> &AddonConfig {
        &self.addon
    }

    pub fn builder(&self) -> &BuilderConfig {
        &self.builder
    }

    pub fn flags(&self) -> RunFlags {
        self.flags
    }

    /// Directory relative output paths are resolved against.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Base directory for public releases (`RELEASE_FOLDER`).
    pub fn public_release_root(&self) -> Option<&Path> {
        self.public_release_root.as_deref()
    }

    /// Whether a README goes next to the dev artifact.
    pub fn wants_readme(&self) -> bool {
        self.flags.readme || self.builder.readme || self.addon.build.readme
    }

    /// One-shot production runs remove the temp directory when done.
    pub fn removes_temp(&self) -> bool {
        self.addon.build.production && !self.flags.watch
    }

    /// Process start time.
    pub fn started(&self) -> Instant {
        self.started
    }
}
