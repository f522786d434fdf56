//! Post-compile assembly and packaging for plugin addons.
//!
//! Compiled JavaScript goes in; a single distributable `.plugin.js` file
//! comes out, along with optional release directories and host installs.

pub mod assembly;
pub mod builder;
pub mod error;
pub mod packaging;
pub mod settings;
pub mod utils;

pub use builder::{CommandCompiler, CompileResult, Compiler, PassReport, Pipeline};
pub use error::{Error, Result};
pub use settings::{BuildContext, BuilderConfig, RunFlags};
