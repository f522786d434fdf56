//! Builder configuration loaded from `builder.toml`.
//!
//! The file form ([`BuilderConfigFile`]) leaves every field optional.
//! [`BuilderConfigFile::resolve`] fills in defaults so no stage ever reads a
//! half-populated value.

use crate::bundler::error::{Error, ErrorExt, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default builder config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "builder.toml";

/// Builder config as written on disk.
///
/// # Configuration
///
/// ```toml
/// [paths]
/// plugins = "plugins"
/// host_folder = "~/.config/BetterDiscord"
///
/// [build]
/// filename = "[name].plugin.js"
/// output = "builds/[name]"
/// install = true
///
/// [compiler]
/// program = "npx"
/// args = ["webpack"]
/// optimization = ["--no-optimization-minimize"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuilderConfigFile {
    pub paths: PathsFile,
    pub build: BuildFile,
    pub compiler: CompilerFile,
    pub watch: WatchFile,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsFile {
    pub plugins: Option<PathBuf>,
    pub temp: Option<PathBuf>,
    pub releases: Option<PathBuf>,
    pub modules: Option<PathBuf>,
    pub host_folder: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildFile {
    pub filename: Option<String>,
    pub output: Option<String>,
    pub readme: Option<bool>,
    pub install: Option<bool>,
    pub delimiters: Option<(String, String)>,
    pub wrapper_template: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompilerFile {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub extra_args: Option<Vec<String>>,
    pub optimization: Option<Vec<String>>,
    pub target: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatchFile {
    pub interval_ms: Option<u64>,
}

/// Fully resolved builder configuration.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Directory holding one sub-directory per addon.
    pub plugins_dir: PathBuf,
    /// Scratch directory the compiler writes into.
    pub temp_dir: PathBuf,
    /// Root of internal (non-public) releases.
    pub releases_dir: PathBuf,
    /// Directory of external module sources.
    pub modules_dir: PathBuf,
    /// Host application folder; artifacts install into `<host>/plugins`.
    pub host_folder: PathBuf,
    /// Naming and placement templates.
    pub templates: PathTemplates,
    /// Write a README next to dev builds by default.
    pub readme: bool,
    /// Install into the host plugin folder after building.
    pub install: bool,
    /// Optional file replacing the built-in wrapper template.
    pub wrapper_template: Option<PathBuf>,
    /// How to run the compiler.
    pub compiler: CompilerSettings,
    /// Source polling interval in watch mode.
    pub watch_interval: Duration,
}

/// Filename and output-directory patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplates {
    pub filename: String,
    pub output: String,
    pub delimiters: Delimiters,
}

/// Bracket pair around path placeholders, `[` and `]` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "[".to_string(),
            close: "]".to_string(),
        }
    }
}

impl Default for PathTemplates {
    fn default() -> Self {
        Self {
            filename: "[name].plugin.js".to_string(),
            output: "builds".to_string(),
            delimiters: Delimiters::default(),
        }
    }
}

/// Compiler invocation settings.
#[derive(Debug, Clone)]
pub struct CompilerSettings {
    pub program: String,
    pub args: Vec<String>,
    /// Opaque plugin/rule/resolve flags passed through unchanged.
    pub extra_args: Vec<String>,
    /// Optimization flags. Minification stays off so the emitted bundle
    /// keeps its line structure for module injection.
    pub optimization: Vec<String>,
    pub target: String,
    pub mode: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            args: vec!["webpack".to_string()],
            extra_args: Vec::new(),
            optimization: vec!["--no-optimization-minimize".to_string()],
            target: "node".to_string(),
            mode: "production".to_string(),
        }
    }
}

impl BuilderConfigFile {
    /// Parses the TOML form.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Fills every absent field with its default.
    pub fn resolve(self) -> Result<BuilderConfig> {
        let delimiters = match self.build.delimiters {
            Some((open, close)) => {
                if open.is_empty() || close.is_empty() {
                    return Err(Error::Config(
                        "build.delimiters must be two non-empty strings".to_string(),
                    ));
                }
                Delimiters { open, close }
            }
            None => Delimiters::default(),
        };

        let defaults = PathTemplates::default();
        let templates = PathTemplates {
            filename: self.build.filename.unwrap_or(defaults.filename),
            output: self.build.output.unwrap_or(defaults.output),
            delimiters,
        };

        let host_folder = match self.paths.host_folder {
            Some(raw) => expand_home(&raw),
            None => default_host_folder(),
        };

        let compiler_defaults = CompilerSettings::default();
        let compiler = CompilerSettings {
            program: self.compiler.program.unwrap_or(compiler_defaults.program),
            args: self.compiler.args.unwrap_or(compiler_defaults.args),
            extra_args: self.compiler.extra_args.unwrap_or_default(),
            optimization: self
                .compiler
                .optimization
                .unwrap_or(compiler_defaults.optimization),
            target: self.compiler.target.unwrap_or(compiler_defaults.target),
            mode: self.compiler.mode.unwrap_or(compiler_defaults.mode),
        };

        Ok(BuilderConfig {
            plugins_dir: self.paths.plugins.unwrap_or_else(|| "plugins".into()),
            temp_dir: self.paths.temp.unwrap_or_else(|| ".temp".into()),
            releases_dir: self.paths.releases.unwrap_or_else(|| "releases".into()),
            modules_dir: self.paths.modules.unwrap_or_else(|| "modules".into()),
            host_folder,
            templates,
            readme: self.build.readme.unwrap_or(false),
            install: self.build.install.unwrap_or(false),
            wrapper_template: self.build.wrapper_template,
            compiler,
            watch_interval: Duration::from_millis(self.watch.interval_ms.unwrap_or(500).max(50)),
        })
    }
}

impl BuilderConfig {
    /// Loads the builder config, falling back to defaults when the file is absent.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path)
            .await
            .fs_context("reading builder config", path)
        {
            Ok(text) => BuilderConfigFile::from_toml(&text)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
                .resolve(),
            Err(e) if e.is_not_found() => {
                log::debug!(
                    "No builder config at {}, using defaults",
                    path.display()
                );
                BuilderConfigFile::default().resolve()
            }
            Err(e) => Err(e),
        }
    }

    /// Makes every relative directory absolute against `cwd`.
    pub fn anchored(mut self, cwd: &Path) -> Self {
        for dir in [
            &mut self.plugins_dir,
            &mut self.temp_dir,
            &mut self.releases_dir,
            &mut self.modules_dir,
            &mut self.host_folder,
        ] {
            if dir.is_relative() {
                *dir = cwd.join(&*dir);
            }
        }
        if let Some(template) = self.wrapper_template.as_mut() {
            if template.is_relative() {
                *template = cwd.join(&*template);
            }
        }
        self
    }

    /// Host plugin directory, `<host_folder>/plugins`.
    pub fn host_plugins_dir(&self) -> PathBuf {
        self.host_folder.join("plugins")
    }
}

/// Expands a leading `~` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            let rest = rest.trim_start_matches(['/', '\\']);
            return if rest.is_empty() { home } else { home.join(rest) };
        }
    }
    PathBuf::from(raw)
}

fn default_host_folder() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("BetterDiscord")
}
