//! Command line argument parsing and validation.
//!
//! This module provides the clap definition of the command line and the
//! conversions from parsed arguments into pipeline inputs.

use crate::bundler::settings::{DEFAULT_CONFIG_FILE, RunFlags};
use crate::error::CliError;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Assembles and packages compiled plugin addons
#[derive(Parser, Debug)]
#[command(
    name = "addon_bundler",
    version,
    about = "Assembles and packages compiled plugin addons",
    long_about = "Compiles a plugin addon, injects external modules, wraps or normalizes its exports,
prepends the meta header, formats the result and writes a single .plugin.js file.

Usage:
  addon_bundler --plugin MyPlugin
  addon_bundler --plugin MyPlugin --build --readme
  addon_bundler --plugin MyPlugin --release
  RELEASE_FOLDER=../public addon_bundler --plugin MyPlugin --release
  addon_bundler --plugin MyPlugin --watch

Exit code 0 = the artifact was written to its output path."
)]
#[command(group(ArgGroup::new("addon").required(true).args(["plugin", "theme"])))]
pub struct Args {
    /// Plugin to build (directory name under the plugins folder)
    #[arg(short = 'p', long, value_name = "NAME")]
    pub plugin: Option<String>,

    /// Theme to build
    #[arg(short = 't', long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Build only: keep the previous artifact and write README when requested
    #[arg(short = 'b', long)]
    pub build: bool,

    /// Write a README next to the built artifact
    #[arg(long)]
    pub readme: bool,

    /// Produce a release directory
    #[arg(short = 'r', long)]
    pub release: bool,

    /// Rebuild whenever the addon sources change
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Builder config file
    #[arg(short = 'c', long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Base directory for public releases
    #[arg(long, value_name = "DIR", env = "RELEASE_FOLDER")]
    pub release_folder: Option<PathBuf>,

    /// Project root; defaults to the current directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// What the invocation asks to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Plugin(String),
    Theme(String),
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        let name = match self.target()? {
            Target::Plugin(name) | Target::Theme(name) => name,
        };

        if name.trim().is_empty() {
            return Err(CliError::InvalidArguments {
                reason: "addon name cannot be empty".to_string(),
            });
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(CliError::InvalidArguments {
                reason: format!("addon name must be a single directory name: {}", name),
            });
        }

        Ok(())
    }

    /// The selected addon.
    pub fn target(&self) -> Result<Target, CliError> {
        match (&self.plugin, &self.theme) {
            (Some(plugin), None) => Ok(Target::Plugin(plugin.clone())),
            (None, Some(theme)) => Ok(Target::Theme(theme.clone())),
            (Some(_), Some(_)) => Err(CliError::InvalidArguments {
                reason: "--plugin and --theme are mutually exclusive".to_string(),
            }),
            (None, None) => Err(CliError::MissingArgument {
                argument: "--plugin or --theme".to_string(),
            }),
        }
    }
}

impl From<&Args> for RunFlags {
    fn from(args: &Args) -> Self {
        Self {
            build: args.build,
            readme: args.readme,
            release: args.release,
            watch: args.watch,
        }
    }
}
