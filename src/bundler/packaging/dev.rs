//! Dev build output.

use super::{PackageOptions, ResolvedPaths, log_written};
use crate::bundler::assembly::Readme;
use crate::bundler::error::{ErrorExt, Result};
use crate::bundler::utils::fs::{remove_file_if_exists, write_artifact};

/// Writes the artifact to its resolved output path.
///
/// Build-only runs may add a README next to it. Other runs first remove the
/// previous artifact; a missing file is fine, any other removal failure is
/// logged and the write still happens.
pub(super) async fn write_dev_build(
    artifact: &str,
    paths: &ResolvedPaths,
    options: &PackageOptions<'_>,
) -> Result<Vec<std::path::PathBuf>> {
    let mut written = Vec::new();

    if options.build_only {
        if options.readme {
            let readme_path = paths.output_folder.join("README.md");
            let readme = Readme::new(options.addon).to_string();
            match tokio::fs::write(&readme_path, readme)
                .await
                .fs_context("writing README", &readme_path)
            {
                Ok(()) => written.push(readme_path),
                Err(e) => log::error!("{}", e),
            }
        }
    } else {
        match remove_file_if_exists(&paths.output_path).await {
            Ok(true) => log::debug!("Removed old {}", paths.output_path.display()),
            Ok(false) => {}
            Err(e) => log::error!("Failed to remove old file:\n{}", e),
        }
    }

    let checksum = write_artifact(&paths.output_path, artifact).await?;
    log_written(&paths.output_path, &checksum);
    written.push(paths.output_path.clone());
    Ok(written)
}
