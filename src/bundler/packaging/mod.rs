//! Artifact packaging: dev output, releases, host installs and cleanup.
//!
//! Each [`PackageMode`] is a best-effort side effect. Failures inside a mode
//! are logged and reported through [`PackageOutcome`]; they never abort the
//! pass.

mod cleanup;
mod dev;
mod install;
mod paths;
mod release;

pub use cleanup::cleanup_temp;
pub use paths::{
    PathVariables, ResolvedPaths, escape_name, expand_path_template, plan_paths, release_dir,
    resolve,
};

use crate::bundler::settings::BuildContext;
use crate::metadata::AddonConfig;
use std::path::{Path, PathBuf};

/// Where a packaging step sends the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageMode {
    /// Write to the resolved output path.
    DevBuild,
    /// Populate a fresh release directory.
    Release,
    /// Copy into the host's plugin directory.
    Install,
    None,
}

impl PackageMode {
    /// Destination after the dev build: release wins over install.
    pub fn destination(release: bool, install: bool) -> Self {
        if release {
            Self::Release
        } else if install {
            Self::Install
        } else {
            Self::None
        }
    }
}

/// The slice of the build context packaging reads.
#[derive(Debug, Clone)]
pub struct PackageOptions<'a> {
    pub addon: &'a AddonConfig,
    /// Addon source tree, copied into releases
    pub addon_dir: &'a Path,
    /// Build-only run: keep the previous artifact
    pub build_only: bool,
    /// Write README next to the dev artifact
    pub readme: bool,
    pub releases_dir: &'a Path,
    pub public_release_root: Option<&'a Path>,
    /// `<host folder>/plugins`
    pub host_plugins_dir: PathBuf,
}

impl<'a> PackageOptions<'a> {
    pub fn from_context(context: &'a BuildContext) -> Self {
        Self {
            addon: context.addon(),
            addon_dir: context.addon_dir(),
            build_only: context.flags().build,
            readme: context.wants_readme(),
            releases_dir: &context.builder().releases_dir,
            public_release_root: context.public_release_root(),
            host_plugins_dir: context.builder().host_plugins_dir(),
        }
    }
}

/// What a packaging step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    /// Files written by the step, artifact last.
    Written(Vec<PathBuf>),
    /// Nothing to do.
    Skipped,
    /// The step failed; the message was logged.
    Failed(String),
}

impl PackageOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Runs one packaging step for `artifact`.
pub async fn package(
    artifact: &str,
    paths: &ResolvedPaths,
    mode: PackageMode,
    options: &PackageOptions<'_>,
) -> PackageOutcome {
    let result = match mode {
        PackageMode::DevBuild => dev::write_dev_build(artifact, paths, options).await,
        PackageMode::Release => release::write_release(artifact, paths, options).await,
        PackageMode::Install => install::install(artifact, paths, options).await,
        PackageMode::None => return PackageOutcome::Skipped,
    };

    match result {
        Ok(written) => PackageOutcome::Written(written),
        Err(e) => {
            let message = e.to_string();
            match mode {
                PackageMode::Release => log::error!("Release build failed!\n{}", message),
                PackageMode::Install => log::error!("Install failed!\n{}", message),
                _ => log::error!("Failed to write build output!\n{}", message),
            }
            PackageOutcome::Failed(message)
        }
    }
}

/// Logs a written artifact with its checksum.
fn log_written(path: &Path, checksum: &str) {
    log::info!("Wrote {} (sha256 {})", path.display(), checksum);
}
