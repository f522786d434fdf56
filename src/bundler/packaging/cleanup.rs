//! Temp directory cleanup after one-shot production builds.

use crate::bundler::utils::fs::remove_dir_all;
use std::path::Path;

/// Removes the compiler's temp directory when `remove` is set.
///
/// Failures are logged; the run is complete either way. Returns whether the
/// directory is gone.
pub async fn cleanup_temp(temp_dir: &Path, remove: bool) -> bool {
    if !remove {
        log::debug!("Keeping {} for incremental builds", temp_dir.display());
        return false;
    }

    match remove_dir_all(temp_dir).await {
        Ok(()) => {
            log::debug!("Removed {}", temp_dir.display());
            true
        }
        Err(e) => {
            log::error!("Failed to clear tmp path:\n{}", e);
            false
        }
    }
}
