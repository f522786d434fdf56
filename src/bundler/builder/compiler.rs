//! Compiler invocation and result classification.
//!
//! The compiler is an external process. It is handed a [`BuildDescription`],
//! reports a stats document on stdout, and leaves its bundle in the output
//! directory. Every outcome, including a failure to start it, becomes a
//! [`CompileResult`].

use crate::bundler::settings::CompilerSettings;
use serde::Deserialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Library name the compiler exports the bundle under.
pub const LIBRARY_NAME: &str = "LibraryPluginHack";

/// Module format of the compiler output.
pub const LIBRARY_TYPE: &str = "commonjs2";

/// Everything the compiler needs for one build.
///
/// Created once per invocation and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescription {
    /// Compile target (e.g., "node")
    pub target: String,
    /// Compiler mode (e.g., "production")
    pub mode: String,
    /// Entry point; the addon source directory
    pub entry: PathBuf,
    /// Directory the compiler writes into
    pub output_dir: PathBuf,
    /// Name of the emitted file inside `output_dir`
    pub output_filename: String,
    /// Recompile on source change
    pub watch: bool,
    /// Optimization flags, placed before `extra_args`
    pub optimization: Vec<String>,
    /// Opaque plugin/rule/resolve flags
    pub extra_args: Vec<String>,
}

impl BuildDescription {
    /// Path of the file the compiler emits.
    pub fn emitted_file(&self) -> PathBuf {
        self.output_dir.join(&self.output_filename)
    }

    /// Command line flags describing this build.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--output-path".to_string(),
            self.output_dir.display().to_string(),
            "--output-filename".to_string(),
            self.output_filename.clone(),
            "--entry".to_string(),
            self.entry.display().to_string(),
            "--target".to_string(),
            self.target.clone(),
            "--mode".to_string(),
            self.mode.clone(),
            "--output-library-name".to_string(),
            LIBRARY_NAME.to_string(),
            "--output-library-type".to_string(),
            LIBRARY_TYPE.to_string(),
            "--output-clean".to_string(),
            "--json".to_string(),
        ];
        args.extend(self.optimization.iter().cloned());
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Outcome of one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileResult {
    Success {
        /// Contents of the emitted file
        code: String,
        warnings: Vec<String>,
    },
    Failure {
        errors: Vec<String>,
    },
}

/// Something that turns a [`BuildDescription`] into a [`CompileResult`].
pub trait Compiler {
    fn compile(&self, description: &BuildDescription) -> impl Future<Output = CompileResult>;
}

/// Runs the configured compiler program as a child process.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandCompiler {
    pub fn new(settings: &CompilerSettings, working_dir: &Path) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
            working_dir: working_dir.to_path_buf(),
        }
    }

    async fn run(&self, description: &BuildDescription) -> CompileResult {
        let program = match which::which(&self.program) {
            Ok(path) => path,
            Err(e) => {
                return CompileResult::Failure {
                    errors: vec![format!("compiler `{}` not found: {}", self.program, e)],
                };
            }
        };

        let mut args = self.args.clone();
        args.extend(description.to_args());
        log::debug!("Running {} {}", program.display(), args.join(" "));

        let output = Command::new(&program)
            .args(&args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                return CompileResult::Failure {
                    errors: vec![format!("failed to run `{}`: {}", self.program, e)],
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stats = parse_stats(&stdout);

        let mut errors = stats.as_ref().map(|s| s.errors()).unwrap_or_default();
        let warnings = stats.as_ref().map(|s| s.warnings()).unwrap_or_default();

        if !output.status.success() && errors.is_empty() {
            errors = stderr
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
            if errors.is_empty() {
                errors.push(format!("compiler exited with {}", output.status));
            }
        }

        if !errors.is_empty() {
            return CompileResult::Failure { errors };
        }

        let emitted = description.emitted_file();
        let code = match tokio::fs::read_to_string(&emitted).await {
            Ok(code) => code,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "Compiler reported success but {} does not exist; treating it as empty",
                    emitted.display()
                );
                String::new()
            }
            Err(e) => {
                return CompileResult::Failure {
                    errors: vec![format!("failed to read {}: {}", emitted.display(), e)],
                };
            }
        };

        CompileResult::Success { code, warnings }
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, description: &BuildDescription) -> impl Future<Output = CompileResult> {
        self.run(description)
    }
}

/// Stats document the compiler prints with `--json`.
#[derive(Debug, Default, Deserialize)]
struct Stats {
    #[serde(default)]
    errors: Vec<StatsMessage>,
    #[serde(default)]
    warnings: Vec<StatsMessage>,
}

/// Older compilers report bare strings, newer ones objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatsMessage {
    Text(String),
    Detailed { message: String },
}

impl StatsMessage {
    fn text(&self) -> String {
        match self {
            Self::Text(t) => t.clone(),
            Self::Detailed { message } => message.clone(),
        }
    }
}

impl Stats {
    fn errors(&self) -> Vec<String> {
        self.errors.iter().map(StatsMessage::text).collect()
    }

    fn warnings(&self) -> Vec<String> {
        self.warnings.iter().map(StatsMessage::text).collect()
    }
}

/// Finds and parses the stats JSON, skipping any banner printed before it.
fn parse_stats(stdout: &str) -> Option<Stats> {
    let start = stdout.find('{')?;
    match serde_json::from_str::<Stats>(stdout[start..].trim_end()) {
        Ok(stats) => Some(stats),
        Err(e) => {
            log::debug!("Compiler stdout is not a stats document: {}", e);
            None
        }
    }
}
