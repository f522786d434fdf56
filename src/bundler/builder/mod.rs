//! Build orchestration and coordination.
//!
//! This module provides the [`Pipeline`] that drives compile, assembly,
//! formatting, path resolution, packaging and cleanup for one addon.
//!
//! # Overview
//!
//! A pass:
//! 1. Hands a [`BuildDescription`] to a [`Compiler`]
//! 2. Injects external modules and wraps or normalizes the output
//! 3. Prepends the meta block and re-indents
//! 4. Resolves output paths from the configured templates
//! 5. Writes the dev build, then releases or installs
//! 6. Removes the temp directory on one-shot production builds
//!
//! # Example
//!
//! ```no_run
//! use addon_bundler::bundler::{BuildContext, CommandCompiler, Pipeline};
//!
//! # async fn example(context: BuildContext) -> addon_bundler::bundler::Result<()> {
//! let compiler = CommandCompiler::new(&context.builder().compiler, context.cwd());
//! let pipeline = Pipeline::new(context).await?;
//! let report = pipeline.run_pass(&compiler).await?;
//! println!("Wrote {}", report.paths.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`compiler`] - Compiler trait and the subprocess implementation
//! - [`orchestrator`] - [`Pipeline`] and its pass/watch loops
//! - [`watch`] - Source tree polling for watch mode

pub mod compiler;
mod orchestrator;
pub mod watch;

pub use compiler::{
    BuildDescription, CommandCompiler, CompileResult, Compiler, LIBRARY_NAME, LIBRARY_TYPE,
};
pub use orchestrator::{PassReport, Pipeline, Stage};
pub use watch::{Fingerprint, SourceWatcher};
