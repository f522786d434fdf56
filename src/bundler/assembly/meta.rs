//! Meta header and README generation from addon metadata.

use crate::metadata::AddonConfig;
use std::fmt;

/// Header comment the host reads addon metadata from.
///
/// Rendering is deterministic: tags always appear in the same order and
/// absent fields are skipped.
#[derive(Debug, Clone)]
pub struct MetaBlock {
    tags: Vec<(&'static str, String)>,
}

impl MetaBlock {
    pub fn new(config: &AddonConfig) -> Self {
        let info = &config.info;
        let mut tags = vec![("name", info.name.clone())];

        if !info.authors.is_empty() {
            tags.push(("author", config.author_names()));
        }
        if let Some(id) = info.authors.iter().find_map(|a| a.discord_id.clone()) {
            tags.push(("authorId", id));
        }
        if !info.version.is_empty() {
            tags.push(("version", info.version.clone()));
        }
        if !info.description.is_empty() {
            tags.push(("description", info.description.clone()));
        }

        let optional = [
            ("website", info.website.as_ref().or(info.github.as_ref())),
            ("source", info.github_raw.as_ref()),
            ("invite", info.invite.as_ref()),
            ("donate", info.donate.as_ref()),
            ("patreon", info.patreon.as_ref()),
        ];
        for (tag, value) in optional {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                tags.push((tag, value.clone()));
            }
        }

        Self { tags }
    }
}

impl fmt::Display for MetaBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "/**")?;
        for (tag, value) in &self.tags {
            // A "*/" inside a value would end the comment early.
            writeln!(f, " * @{} {}", tag, value.replace("*/", "* /"))?;
        }
        write!(f, " */")
    }
}

/// README rendered from addon metadata.
#[derive(Debug, Clone)]
pub struct Readme<'a> {
    config: &'a AddonConfig,
}

impl<'a> Readme<'a> {
    pub fn new(config: &'a AddonConfig) -> Self {
        Self { config }
    }
}

impl fmt::Display for Readme<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = &self.config.info;
        writeln!(f, "# {}", info.name)?;
        if !info.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", info.description)?;
        }

        writeln!(f)?;
        if !info.version.is_empty() {
            writeln!(f, "**Version:** {}  ", info.version)?;
        }
        if !info.authors.is_empty() {
            let authors: Vec<String> = info
                .authors
                .iter()
                .map(|a| match &a.github_username {
                    Some(user) => format!("[{}](https://github.com/{})", a.name, user),
                    None => a.name.clone(),
                })
                .collect();
            writeln!(f, "**Author:** {}  ", authors.join(", "))?;
        }
        if let Some(source) = &info.github {
            writeln!(f, "**Source:** {}  ", source)?;
        }

        if !self.config.changelog.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Changelog")?;
            for entry in &self.config.changelog {
                writeln!(f)?;
                writeln!(f, "### {}", entry.title)?;
                writeln!(f)?;
                for item in &entry.items {
                    writeln!(f, "- {}", item)?;
                }
            }
        }
        Ok(())
    }
}
