//! Pipeline orchestration.
//!
//! This module provides the [`Pipeline`] that drives one pass through
//! compile, assembly, formatting, path resolution, packaging and cleanup, and
//! repeats passes in watch mode.

use super::compiler::{BuildDescription, CompileResult, Compiler};
use super::watch::SourceWatcher;
use crate::bundler::{
    Error, Result,
    assembly::{self, ExternalModuleSet, MetaBlock, WrapperMode},
    error::ErrorExt,
    packaging::{
        self, PackageMode, PackageOptions, PackageOutcome, PathVariables, ResolvedPaths,
    },
    settings::BuildContext,
};
use std::future::Future;
use std::time::Instant;

/// Stage a pass is in; logged at debug level as the pass advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compiling,
    Assembling,
    Formatting,
    PathResolving,
    Packaging,
    Cleanup,
}

/// What a completed pass produced.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub paths: ResolvedPaths,
    /// Formatted artifact text
    pub artifact: String,
    pub warnings: Vec<String>,
    /// Dev build outcome
    pub dev: PackageOutcome,
    /// Release or install outcome
    pub destination: PackageOutcome,
    /// Whether the temp directory was removed
    pub cleaned: bool,
}

/// Single build pipeline.
///
/// Owns the immutable [`BuildContext`], the description handed to the
/// compiler and the external modules loaded at startup. Passes never overlap.
#[derive(Debug)]
pub struct Pipeline {
    context: BuildContext,
    description: BuildDescription,
    modules: ExternalModuleSet,
    wrapper_template: Option<String>,
}

impl Pipeline {
    /// Creates a pipeline, loading external modules and any wrapper template override.
    pub async fn new(context: BuildContext) -> Result<Self> {
        let modules = ExternalModuleSet::load(&context.builder().modules_dir).await?;

        let wrapper_template = match &context.builder().wrapper_template {
            Some(path) => Some(
                tokio::fs::read_to_string(path)
                    .await
                    .fs_context("reading wrapper template", path)?,
            ),
            None => None,
        };

        Ok(Self::with_modules(context, modules, wrapper_template))
    }

    /// Creates a pipeline from already-loaded parts.
    pub fn with_modules(
        context: BuildContext,
        modules: ExternalModuleSet,
        wrapper_template: Option<String>,
    ) -> Self {
        let description = describe(&context);
        Self {
            context,
            description,
            modules,
            wrapper_template,
        }
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn description(&self) -> &BuildDescription {
        &self.description
    }

    /// Runs one pass.
    ///
    /// Returns [`Error::Compile`] without writing anything when the compiler
    /// fails. Packaging and cleanup failures are logged and reported in the
    /// [`PassReport`] instead.
    pub async fn run_pass<C: Compiler>(&self, compiler: &C) -> Result<PassReport> {
        let started = Instant::now();

        enter(Stage::Compiling);
        let (raw, warnings) = match compiler.compile(&self.description).await {
            CompileResult::Failure { errors } => {
                for error in &errors {
                    log::error!("{}", error);
                }
                return Err(Error::Compile {
                    errors,
                    elapsed: started.elapsed().as_secs_f64(),
                });
            }
            CompileResult::Success { code, warnings } => {
                for warning in &warnings {
                    log::warn!("{}", warning);
                }
                (code, warnings)
            }
        };

        let addon = self.context.addon();

        enter(Stage::Assembling);
        let meta = MetaBlock::new(addon);
        let config_json;
        let mode = if addon.build.zlibrary {
            config_json = addon.to_pretty_json()?;
            WrapperMode::Template {
                config_json: &config_json,
                template: self.wrapper_template.as_deref(),
            }
        } else {
            WrapperMode::Plain
        };
        let assembled = assembly::assemble(&raw, &self.modules, &meta, mode)?;

        enter(Stage::Formatting);
        let artifact = assembled.formatted();

        enter(Stage::PathResolving);
        let vars = PathVariables::for_addon(addon);
        let paths = packaging::resolve(
            &vars,
            &self.context.builder().templates,
            self.context.cwd(),
        )
        .await?;
        log::debug!("Output for {}: {}", vars.name(), paths.output_path.display());

        enter(Stage::Packaging);
        let options = PackageOptions::from_context(&self.context);
        let dev = packaging::package(&artifact, &paths, PackageMode::DevBuild, &options).await;
        if !dev.is_failed() {
            log::info!("Built in {:.2}s.", started.elapsed().as_secs_f64());
        }

        let flags = self.context.flags();
        let destination = PackageMode::destination(flags.release, self.context.builder().install);
        let destination =
            packaging::package(&artifact, &paths, destination, &options).await;

        enter(Stage::Cleanup);
        let cleaned = packaging::cleanup_temp(
            &self.context.builder().temp_dir,
            self.context.removes_temp(),
        )
        .await;

        Ok(PassReport {
            paths,
            artifact,
            warnings,
            dev,
            destination,
            cleaned,
        })
    }

    /// Runs passes until Ctrl-C, one per source change.
    ///
    /// A failed compile aborts only its own pass; the loop waits for the
    /// next change.
    pub async fn run_watch<C: Compiler>(&self, compiler: &C) -> Result<()> {
        self.run_watch_until(compiler, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Runs passes until `shutdown` resolves, whether a pass is in flight
    /// or the loop is waiting for a change.
    pub async fn run_watch_until<C, S>(&self, compiler: &C, shutdown: S) -> Result<()>
    where
        C: Compiler,
        S: Future<Output = ()>,
    {
        let mut watcher = SourceWatcher::new(
            self.context.addon_dir().to_path_buf(),
            self.context.builder().watch_interval,
        )
        .await?;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = self.run_pass(compiler) => match result {
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => log::error!("{}", e),
                    Err(e) => return Err(e),
                },
                _ = &mut shutdown => {
                    log::info!("Stopping watch mode");
                    return Ok(());
                }
            }
            log::info!("Watching {} for changes...", self.context.addon_dir().display());

            tokio::select! {
                changed = watcher.changed() => changed?,
                _ = &mut shutdown => {
                    log::info!("Stopping watch mode");
                    return Ok(());
                }
            }
        }
    }
}

fn enter(stage: Stage) {
    log::debug!("Pipeline stage: {:?}", stage);
}

/// Builds the compiler description from the context.
fn describe(context: &BuildContext) -> BuildDescription {
    let compiler = &context.builder().compiler;
    BuildDescription {
        target: compiler.target.clone(),
        mode: compiler.mode.clone(),
        entry: context.addon_dir().to_path_buf(),
        output_dir: context.builder().temp_dir.clone(),
        output_filename: context.addon().main_file().to_string(),
        watch: context.flags().watch,
        optimization: compiler.optimization.clone(),
        extra_args: compiler.extra_args.clone(),
    }
}
