//! Error taxonomy for the assembly and packaging pipeline.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error.
///
/// [`Error::Compile`] and [`Error::UnsupportedMode`] are fatal to a run;
/// everything else is recovered at the boundary of the stage that raised it.
#[derive(Error, Debug)]
pub enum Error {
    /// The compiler reported errors or faulted.
    #[error("Failed to build after {elapsed:.2}s.")]
    Compile {
        /// Every error message the compiler reported.
        errors: Vec<String>,
        /// Seconds since the pass started.
        elapsed: f64,
    },

    /// A build mode that has no implementation.
    #[error("{0} loader is not implemented yet.")]
    UnsupportedMode(String),

    /// The `build.release` section is not an object or cannot be satisfied.
    #[error("Invalid release configuration: {0}")]
    InvalidReleaseConfig(String),

    /// Malformed addon or builder configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error with the operation and path that caused it.
    #[error("{context} ({}): {source}", path.display())]
    Fs {
        /// What was being done.
        context: &'static str,
        /// The path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Bare I/O error.
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Wrapper template failed to render.
    #[error("failed to render wrapper template: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Directory walk failed.
    #[error("{0}")]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix stripping failed.
    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Whether this error terminates the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Compile { .. } | Self::UnsupportedMode(_))
    }

    /// Whether this is a filesystem "not found" condition.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Fs { source, .. } | Self::IoError(source) => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

/// Attach operation and path context to I/O results.
pub trait ErrorExt<T> {
    /// Wraps the error in [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Return early with a formatted [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}
