//! Installation into the host's plugin directory.

use super::{PackageOptions, ResolvedPaths, log_written};
use crate::bundler::error::Result;
use crate::bundler::utils::fs::{ensure_dir, write_artifact};
use std::path::PathBuf;

/// Copies the artifact into the host plugin directory, replacing any prior version.
pub(super) async fn install(
    artifact: &str,
    paths: &ResolvedPaths,
    options: &PackageOptions<'_>,
) -> Result<Vec<PathBuf>> {
    ensure_dir(&options.host_plugins_dir).await?;

    let target = options.host_plugins_dir.join(&paths.output_filename);
    let checksum = write_artifact(&target, artifact).await?;
    log_written(&target, &checksum);
    log::info!("Installed {}", paths.output_filename);
    Ok(vec![target])
}

#[cfg(test)]
mod tests {
    use super::super::{PackageMode, PackageOutcome, package};
    use super::*;
    use crate::metadata::AddonConfig;

    #[tokio::test]
    async fn test_install_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let host_plugins = dir.path().join("BetterDiscord/plugins");
        let addon = AddonConfig::from_json(r#"{"info": {"name": "My Plugin"}}"#).unwrap();
        let paths = ResolvedPaths {
            output_folder: dir.path().join("builds"),
            output_filename: "MyPlugin.plugin.js".into(),
            output_path: dir.path().join("builds/MyPlugin.plugin.js"),
        };
        let options = PackageOptions {
            addon: &addon,
            addon_dir: dir.path(),
            build_only: false,
            readme: false,
            releases_dir: dir.path(),
            public_release_root: None,
            host_plugins_dir: host_plugins.clone(),
        };

        package("v1", &paths, PackageMode::Install, &options).await;
        let outcome = package("v2", &paths, PackageMode::Install, &options).await;

        let target = host_plugins.join("MyPlugin.plugin.js");
        assert_eq!(outcome, PackageOutcome::Written(vec![target.clone()]));
        assert_eq!(std::fs::read_to_string(target).unwrap(), "v2");
    }

    #[test]
    fn test_destination_selection() {
        assert_eq!(PackageMode::destination(true, true), PackageMode::Release);
        assert_eq!(PackageMode::destination(false, true), PackageMode::Install);
        assert_eq!(PackageMode::destination(false, false), PackageMode::None);
    }
}
