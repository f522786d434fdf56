//! Output path resolution.
//!
//! Filename and output-directory patterns use delimited placeholders such as
//! `[name]`. Expansion is flat key/value substitution; unknown placeholders
//! are left as written.

use crate::bundler::error::{Error, ErrorExt, Result};
use crate::bundler::settings::{Delimiters, PathTemplates};
use crate::bundler::utils::fs::ensure_dir;
use crate::metadata::{AddonConfig, ReleaseOptions};
use path_absolutize::Absolutize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Addon name with all whitespace removed.
pub fn escape_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Values available to path templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVariables {
    values: BTreeMap<&'static str, String>,
}

impl PathVariables {
    /// `name` (escaped) and `version` from the addon config.
    pub fn for_addon(config: &AddonConfig) -> Self {
        let mut values = BTreeMap::new();
        values.insert("name", escape_name(&config.info.name));
        values.insert("version", config.info.version.clone());
        Self { values }
    }

    pub fn name(&self) -> &str {
        self.values.get("name").map(String::as_str).unwrap_or_default()
    }
}

/// Replaces `<open>key<close>` with each variable's value.
pub fn expand_path_template(
    template: &str,
    vars: &PathVariables,
    delimiters: &Delimiters,
) -> String {
    vars.values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(
            &format!("{}{}{}", delimiters.open, key, delimiters.close),
            value,
        )
    })
}

/// Where this run's artifact goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Absolute output directory
    pub output_folder: PathBuf,
    /// Artifact file name
    pub output_filename: String,
    /// `output_folder` joined with `output_filename`
    pub output_path: PathBuf,
}

/// Computes output paths without touching the filesystem.
pub fn plan_paths(
    vars: &PathVariables,
    templates: &PathTemplates,
    cwd: &Path,
) -> Result<ResolvedPaths> {
    let output_filename = expand_path_template(&templates.filename, vars, &templates.delimiters);
    if output_filename.is_empty()
        || output_filename.contains(['/', '\\'])
        || output_filename == "."
        || output_filename == ".."
    {
        return Err(Error::Config(format!(
            "build.filename expands to an invalid file name: {:?}",
            output_filename
        )));
    }

    let output = expand_path_template(&templates.output, vars, &templates.delimiters);
    let output_folder = Path::new(&output)
        .absolutize_from(cwd)
        .fs_context("resolving output directory", &output)?
        .into_owned();
    let output_path = output_folder.join(&output_filename);

    Ok(ResolvedPaths {
        output_folder,
        output_filename,
        output_path,
    })
}

/// Computes output paths and creates the output directory.
pub async fn resolve(
    vars: &PathVariables,
    templates: &PathTemplates,
    cwd: &Path,
) -> Result<ResolvedPaths> {
    let paths = plan_paths(vars, templates, cwd)?;
    ensure_dir(&paths.output_folder).await?;
    Ok(paths)
}

/// Release directory for an addon.
///
/// Public releases go under `public_root` (required in that case), internal
/// ones under `internal_root`. Both use the unescaped addon name, which must
/// name a single directory directly below the root.
pub fn release_dir(
    addon_name: &str,
    options: &ReleaseOptions,
    internal_root: &Path,
    public_root: Option<&Path>,
) -> Result<PathBuf> {
    if addon_name.contains(['/', '\\']) || matches!(addon_name.trim(), "" | "." | "..") {
        return Err(Error::InvalidReleaseConfig(format!(
            "addon name {:?} cannot be used as a release directory name",
            addon_name
        )));
    }

    if options.public {
        let root = public_root.ok_or_else(|| {
            Error::InvalidReleaseConfig(
                "public release requested but no release folder is set (RELEASE_FOLDER)"
                    .to_string(),
            )
        })?;
        Ok(root.join(addon_name))
    } else {
        Ok(internal_root.join(addon_name))
    }
}
