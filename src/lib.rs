//! Assembly and packaging pipeline for plugin addons
//!
//! This library turns compiler output into a distributable plugin file:
//! - external module injection and export normalization or template wrapping
//! - meta header generation and re-indentation
//! - dev builds, release directories and host installs
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
