//! External module injection.

use crate::bundler::error::{ErrorExt, Result};
use std::path::Path;

/// Line index the module block is spliced at.
///
/// The compiler's first two lines hold its module-registration scaffold, so
/// the block goes immediately after them.
pub const MODULE_INJECTION_LINE: usize = 2;

/// Ordered external module sources spliced into every artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalModuleSet {
    modules: Vec<String>,
}

impl ExternalModuleSet {
    pub fn new(modules: Vec<String>) -> Self {
        Self { modules }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// All modules joined into one block.
    pub fn block(&self) -> String {
        self.modules.join("\n")
    }

    /// Loads every `*.js` file in `dir`, ordered by file name.
    ///
    /// A missing directory yields an empty set.
    pub async fn load(dir: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
            log::debug!("No external module directory at {}", dir.display());
            return Ok(Self::default());
        }

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .fs_context("reading external module directory", dir)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .fs_context("reading external module directory", dir)?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("js") && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut modules = Vec::with_capacity(paths.len());
        for path in &paths {
            let source = tokio::fs::read_to_string(path)
                .await
                .fs_context("reading external module", path)?;
            modules.push(source.trim_end().to_string());
        }

        log::debug!("Loaded {} external module(s) from {}", modules.len(), dir.display());
        Ok(Self { modules })
    }
}

/// Splices the module block into `code` right after line [`MODULE_INJECTION_LINE`].
///
/// Shorter input gets the block appended at its end. An empty set leaves the
/// code untouched.
pub fn inject_modules(code: &str, modules: &ExternalModuleSet) -> String {
    if modules.is_empty() {
        return code.to_string();
    }

    let mut lines: Vec<&str> = code.split('\n').collect();
    let at = MODULE_INJECTION_LINE.min(lines.len());
    let block = modules.block();
    lines.insert(at, &block);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn modules() -> ExternalModuleSet {
        ExternalModuleSet::new(vec![
            "const Ext = require(\"ext\");".to_string(),
            "const Other = 1;".to_string(),
        ])
    }

    #[test]
    fn test_block_lands_after_second_line() {
        let code = "line0\nline1\nline2\nline3";
        let out = inject_modules(code, &modules());
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(
            lines,
            vec![
                "line0",
                "line1",
                "const Ext = require(\"ext\");",
                "const Other = 1;",
                "line2",
                "line3"
            ]
        );
        assert_eq!(out.matches("const Ext").count(), 1);
    }

    #[test]
    fn test_short_input_appends() {
        assert_eq!(
            inject_modules("only", &modules()),
            "only\nconst Ext = require(\"ext\");\nconst Other = 1;"
        );
    }

    #[test]
    fn test_empty_set_is_noop() {
        assert_eq!(inject_modules("a\nb\nc", &ExternalModuleSet::default()), "a\nb\nc");
    }

    #[tokio::test]
    async fn test_load_sorted_js_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.js"), "const B = 2;\n").unwrap();
        std::fs::write(dir.path().join("a.js"), "const A = 1;\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let set = ExternalModuleSet::load(dir.path()).await.unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.block(), "const A = 1;\nconst B = 2;");

        let missing = ExternalModuleSet::load(&dir.path().join("nope")).await.unwrap();
        assert!(missing.is_empty());
    }
}
