//! Configuration structures for the build pipeline.
//!
//! This module provides the resolved builder configuration, the path
//! templates it carries, and the immutable [`BuildContext`] every pipeline
//! stage reads from.

mod builder;
mod core;

// Re-export all public types
pub use builder::{
    BuilderConfig, BuilderConfigFile, CompilerSettings, DEFAULT_CONFIG_FILE, Delimiters,
    PathTemplates,
};
pub use core::{BuildContext, RunFlags};
