//! Command line interface for the addon bundler.
//!
//! This module turns parsed arguments into an immutable
//! [`BuildContext`] and drives the pipeline once or in watch mode.

mod args;

pub use args::{Args, Target};

use crate::bundler::{
    BuildContext, BuilderConfig, CommandCompiler, Error as PipelineError, Pipeline, RunFlags,
};
use crate::error::Result;
use crate::metadata::load_addon_config;
use anyhow::Context;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    execute(Args::parse_args()).await
}

/// Runs the pipeline for already-parsed arguments.
pub async fn execute(args: Args) -> Result<i32> {
    args.validate()?;

    let name = match args.target()? {
        Target::Plugin(name) => name,
        Target::Theme(_) => return Err(PipelineError::UnsupportedMode("Themes".into()).into()),
    };

    let context = load_context(&args, &name).await?;
    let compiler = CommandCompiler::new(&context.builder().compiler, context.cwd());
    let watch = context.flags().watch;
    let pipeline = Pipeline::new(context).await?;

    if watch {
        pipeline.run_watch(&compiler).await?;
    } else {
        pipeline.run_pass(&compiler).await?;
        log::debug!(
            "Finished in {:.2}s",
            pipeline.context().started().elapsed().as_secs_f64()
        );
    }

    Ok(0)
}

/// Loads builder and addon config and freezes them into a [`BuildContext`].
pub async fn load_context(args: &Args, name: &str) -> Result<BuildContext> {
    let cwd = match &args.cwd {
        Some(dir) => dir.absolutize()?.into_owned(),
        None => std::env::current_dir().context("failed to read the current directory")?,
    };

    let config_path = anchor(&args.config, &cwd);
    let builder = BuilderConfig::load(&config_path).await?.anchored(&cwd);
    log::debug!("Loaded builder config from {}", config_path.display());

    let addon_dir = builder.plugins_dir.join(name);
    let addon = load_addon_config(&addon_dir).await?;
    log::info!("Building {} {}", addon.info.name, addon.info.version);

    let release_root = args.release_folder.as_deref().map(|dir| anchor(dir, &cwd));

    Ok(BuildContext::new(
        addon_dir,
        addon,
        builder,
        RunFlags::from(args),
        cwd,
        release_root,
    ))
}

fn anchor(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    }
}
