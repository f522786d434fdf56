//! Release directory population.

use super::{PackageOptions, ResolvedPaths, log_written, release_dir};
use crate::bundler::assembly::Readme;
use crate::bundler::error::{ErrorExt, Result};
use crate::bundler::utils::fs::{copy_dir_filtered, empty_or_create_dir, write_artifact};
use std::path::PathBuf;

/// Builds a fresh release directory.
///
/// Order: validate `build.release`, empty or create the directory, README
/// (default on), source copy into `src/` (default on), artifact. README and
/// source failures are logged and skipped; the artifact is always attempted.
pub(super) async fn write_release(
    artifact: &str,
    paths: &ResolvedPaths,
    options: &PackageOptions<'_>,
) -> Result<Vec<PathBuf>> {
    let release = options.addon.release_options()?;
    let dir = release_dir(
        &options.addon.info.name,
        &release,
        options.releases_dir,
        options.public_release_root,
    )?;

    empty_or_create_dir(&dir).await?;
    log::debug!("Prepared release directory {}", dir.display());

    let mut written = Vec::new();

    if release.readme {
        let readme_path = dir.join("README.md");
        let readme = Readme::new(options.addon).to_string();
        match tokio::fs::write(&readme_path, readme)
            .await
            .fs_context("writing release README", &readme_path)
        {
            Ok(()) => written.push(readme_path),
            Err(e) => log::error!("{}", e),
        }
    }

    if release.source {
        let src_dir = dir.join("src");
        match copy_dir_filtered(options.addon_dir, &src_dir).await {
            Ok(count) => {
                log::debug!("Copied {} source file(s) to {}", count, src_dir.display());
                written.push(src_dir);
            }
            Err(e) => log::error!("Failed to copy addon source into release:\n{}", e),
        }
    }

    let artifact_path = dir.join(&paths.output_filename);
    let checksum = write_artifact(&artifact_path, artifact).await?;
    log_written(&artifact_path, &checksum);
    written.push(artifact_path);

    log::info!("Release written to {}", dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::super::{PackageMode, PackageOutcome, package};
    use super::*;
    use crate::metadata::AddonConfig;
    use std::path::Path;

    struct Fixture {
        _root: tempfile::TempDir,
        addon_dir: PathBuf,
        releases: PathBuf,
        public: PathBuf,
        paths: ResolvedPaths,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let addon_dir = root.path().join("plugins/MyPlugin");
        std::fs::create_dir_all(addon_dir.join("node_modules/dep")).unwrap();
        std::fs::create_dir_all(addon_dir.join("components")).unwrap();
        std::fs::write(addon_dir.join("index.js"), "export default 1;").unwrap();
        std::fs::write(addon_dir.join("components/a.js"), "a").unwrap();
        std::fs::write(addon_dir.join("node_modules/dep/i.js"), "dep").unwrap();

        let out = root.path().join("builds");
        Fixture {
            addon_dir,
            releases: root.path().join("releases"),
            public: root.path().join("public"),
            paths: ResolvedPaths {
                output_folder: out.clone(),
                output_filename: "MyPlugin.plugin.js".into(),
                output_path: out.join("MyPlugin.plugin.js"),
            },
            _root: root,
        }
    }

    fn addon(release: &str) -> AddonConfig {
        AddonConfig::from_json(&format!(
            r#"{{"info": {{"name": "My Plugin", "version": "1.0.0"}}, "build": {{"release": {}}}}}"#,
            release
        ))
        .unwrap()
    }

    fn options<'a>(fx: &'a Fixture, addon: &'a AddonConfig, public: bool) -> PackageOptions<'a> {
        PackageOptions {
            addon,
            addon_dir: &fx.addon_dir,
            build_only: false,
            readme: false,
            releases_dir: &fx.releases,
            public_release_root: public.then_some(fx.public.as_path()),
            host_plugins_dir: fx.releases.join("unused"),
        }
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_release_with_source() {
        let fx = fixture();
        let addon = addon(r#"{"source": true}"#);

        let outcome = package("code", &fx.paths, PackageMode::Release, &options(&fx, &addon, false)).await;

        let dir = fx.releases.join("My Plugin");
        assert!(matches!(outcome, PackageOutcome::Written(ref w) if w.len() == 3));
        assert_eq!(names(&dir), vec!["MyPlugin.plugin.js", "README.md", "src"]);
        assert!(dir.join("src/index.js").exists());
        assert!(dir.join("src/components/a.js").exists());
        assert!(!dir.join("src/node_modules").exists());
        assert_eq!(std::fs::read_to_string(dir.join("MyPlugin.plugin.js")).unwrap(), "code");
    }

    #[tokio::test]
    async fn test_release_dir_emptied_first() {
        let fx = fixture();
        let dir = fx.releases.join("My Plugin");
        std::fs::create_dir_all(dir.join("stale/deeper")).unwrap();
        std::fs::write(dir.join("stale.txt"), "old").unwrap();
        std::fs::write(dir.join("Old.plugin.js"), "old").unwrap();
        let addon = addon(r#"{"source": false, "readme": false}"#);

        let outcome = package("code", &fx.paths, PackageMode::Release, &options(&fx, &addon, false)).await;

        assert!(!outcome.is_failed());
        assert_eq!(names(&dir), vec!["MyPlugin.plugin.js"]);
    }

    #[tokio::test]
    async fn test_public_release() {
        let fx = fixture();
        let addon = addon(r#"{"public": true, "source": false}"#);

        let outcome = package("code", &fx.paths, PackageMode::Release, &options(&fx, &addon, true)).await;

        assert!(!outcome.is_failed());
        assert!(fx.public.join("My Plugin/MyPlugin.plugin.js").exists());
        assert!(!fx.releases.exists());
    }

    #[tokio::test]
    async fn test_invalid_release_config_is_contained() {
        let fx = fixture();
        let addon = addon("\"yes\"");

        let outcome = package("code", &fx.paths, PackageMode::Release, &options(&fx, &addon, false)).await;

        assert!(matches!(outcome, PackageOutcome::Failed(ref m) if m.contains("must be an object")));
        assert!(!fx.releases.exists());
    }

    #[tokio::test]
    async fn test_failed_source_copy_still_writes_artifact() {
        let fx = fixture();
        std::fs::remove_dir_all(&fx.addon_dir).unwrap();
        let addon = addon("{}");

        let outcome = package("code", &fx.paths, PackageMode::Release, &options(&fx, &addon, false)).await;

        let dir = fx.releases.join("My Plugin");
        assert!(!outcome.is_failed());
        assert!(dir.join("MyPlugin.plugin.js").exists());
        assert!(dir.join("README.md").exists());
        assert!(!dir.join("src").exists());
    }

    #[tokio::test]
    async fn test_dot_names_leave_other_releases_alone() {
        let fx = fixture();
        let other = fx.releases.join("OtherPlugin");
        std::fs::create_dir_all(&other).unwrap();
        std::fs::write(other.join("Other.plugin.js"), "other").unwrap();

        for name in [".", ".."] {
            let addon = AddonConfig::from_json(&format!(
                r#"{{"info": {{"name": "{}"}}, "build": {{"release": {{"source": false}}}}}}"#,
                name
            ))
            .unwrap();

            let outcome = package("code", &fx.paths, PackageMode::Release, &options(&fx, &addon, false)).await;

            assert!(matches!(outcome, PackageOutcome::Failed(ref m) if m.contains("release directory")));
        }
        assert_eq!(names(&fx.releases), vec!["OtherPlugin"]);
        assert_eq!(std::fs::read_to_string(other.join("Other.plugin.js")).unwrap(), "other");
    }
}
