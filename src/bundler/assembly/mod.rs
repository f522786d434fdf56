//! Output assembly: turns raw compiler output into the final artifact text.
//!
//! # Overview
//!
//! 1. [`inject_modules`] splices the [`ExternalModuleSet`] after the
//!    compiler's scaffold lines
//! 2. The code is either wrapped in the plugin-library template
//!    ([`WrapperMode::Template`]) or has its export assignment normalized
//!    ([`WrapperMode::Plain`])
//! 3. The [`MetaBlock`] is prepended
//! 4. [`format`] re-indents the result
//!
//! Nothing here touches the filesystem.

mod format;
mod inject;
mod meta;
mod template;

pub use format::format;
pub use inject::{ExternalModuleSet, MODULE_INJECTION_LINE, inject_modules};
pub use meta::{MetaBlock, Readme};
pub use template::{PLUGIN_WRAPPER_TEMPLATE, render_wrapper};

use crate::bundler::builder::LIBRARY_NAME;
use crate::bundler::error::Result;
use regex::Regex;
use std::sync::LazyLock;

/// Replacement for the compiler's named export assignment.
pub const NORMALIZED_EXPORT: &str =
    "module.exports = __webpack_exports__.default ?? __webpack_exports__";

static EXPORT_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"module\.exports\.{}\s*=\s*__webpack_exports__",
        regex::escape(LIBRARY_NAME)
    ))
    .expect("export assignment pattern is valid")
});

/// How the compiled code is packaged.
#[derive(Debug, Clone, Copy)]
pub enum WrapperMode<'a> {
    /// Self-registering plugin-library wrapper.
    Template {
        /// Addon config serialized as JSON.
        config_json: &'a str,
        /// Replacement for the built-in template.
        template: Option<&'a str>,
    },
    /// Loader-agnostic `module.exports` assignment.
    Plain,
}

/// Header-prefixed, module-injected source, ready for formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledArtifact(String);

impl AssembledArtifact {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Runs the formatter over the assembled text.
    pub fn formatted(&self) -> String {
        format(&self.0)
    }
}

/// Assembles raw compiler output into an artifact.
pub fn assemble(
    raw: &str,
    modules: &ExternalModuleSet,
    meta: &MetaBlock,
    mode: WrapperMode<'_>,
) -> Result<AssembledArtifact> {
    let code = inject_modules(raw, modules);

    let body = match mode {
        WrapperMode::Template {
            config_json,
            template,
        } => render_wrapper(template, config_json, &code)?,
        WrapperMode::Plain => normalize_export(&code),
    };

    Ok(AssembledArtifact(format!("{}\n{}", meta, body)))
}

/// Rewrites the first named export assignment into [`NORMALIZED_EXPORT`].
pub fn normalize_export(code: &str) -> String {
    if !EXPORT_ASSIGNMENT.is_match(code) {
        log::warn!(
            "Compiled output has no module.exports.{} assignment; exports left as-is",
            LIBRARY_NAME
        );
    }
    EXPORT_ASSIGNMENT.replace(code, NORMALIZED_EXPORT).into_owned()
}
