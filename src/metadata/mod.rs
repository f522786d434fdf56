//! Addon metadata loaded from an addon's `config.json`

use crate::bundler::error::{Error, ErrorExt, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the per-addon config inside the addon directory.
pub const ADDON_CONFIG_FILE: &str = "config.json";

/// Entry file emitted by the compiler when the addon names none.
pub const DEFAULT_MAIN: &str = "index.js";

/// Addon configuration snapshot.
///
/// Every key the bundler does not interpret is preserved in `extra` so the
/// wrapper template receives the config exactly as written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonConfig {
    /// Addon metadata
    pub info: AddonInfo,

    /// Compiled entry file name (e.g., "index.js")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Build options
    #[serde(default)]
    pub build: BuildOptions,

    /// Release notes rendered into the README
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changelog: Vec<ChangelogEntry>,

    /// Keys passed through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Addon metadata from the `info` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddonInfo {
    /// Display name; the basis of every output name
    pub name: String,

    /// Version string (e.g., "1.2.0")
    #[serde(default)]
    pub version: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Authors in display order
    #[serde(default)]
    pub authors: Vec<Author>,

    /// Repository page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,

    /// Raw URL of the released artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_raw: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patreon: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Addon author
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    pub name: String,

    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub discord_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
}

/// Per-addon build options from the `build` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildOptions {
    /// One-shot production build; the temp directory is removed afterwards
    #[serde(default)]
    pub production: bool,

    /// Write a README next to the dev artifact
    #[serde(default)]
    pub readme: bool,

    /// Wrap the code in the plugin-library template
    #[serde(default)]
    pub zlibrary: bool,

    /// Raw release section, validated when a release is requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<serde_json::Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Release policy, parsed from a structurally valid `build.release` object.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseOptions {
    /// Release into the public release folder instead of the internal one
    #[serde(default)]
    pub public: bool,

    /// Write README.md into the release directory
    #[serde(default = "default_true")]
    pub readme: bool,

    /// Copy the addon source tree into `src/`
    #[serde(default = "default_true")]
    pub source: bool,
}

fn default_true() -> bool {
    true
}

/// One changelog section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub title: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub items: Vec<String>,
}

impl AddonConfig {
    /// Parses and validates an addon config from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        if config.info.name.trim().is_empty() {
            return Err(Error::Config("info.name must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Compiled entry file name, defaulting to `index.js`.
    pub fn main_file(&self) -> &str {
        self.main
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MAIN)
    }

    /// Validates and parses `build.release`.
    ///
    /// The section must be a JSON object; anything else (including absence)
    /// is an [`Error::InvalidReleaseConfig`].
    pub fn release_options(&self) -> Result<ReleaseOptions> {
        match &self.build.release {
            Some(value @ serde_json::Value::Object(_)) => {
                serde_json::from_value(value.clone()).map_err(|e| {
                    Error::InvalidReleaseConfig(format!("build.release could not be read: {}", e))
                })
            }
            Some(other) => Err(Error::InvalidReleaseConfig(format!(
                "build.release must be an object, found {}",
                json_kind(other)
            ))),
            None => Err(Error::InvalidReleaseConfig(
                "build.release is missing".to_string(),
            )),
        }
    }

    /// Serializes the whole config as tab-indented JSON.
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| Error::GenericError(e.to_string()))
    }

    /// Author names joined for display.
    pub fn author_names(&self) -> String {
        self.info
            .authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Load the addon config from `<addon_dir>/config.json`.
pub async fn load_addon_config(addon_dir: &Path) -> Result<AddonConfig> {
    let path = addon_dir.join(ADDON_CONFIG_FILE);
    let text = tokio::fs::read_to_string(&path)
        .await
        .fs_context("reading addon config", &path)?;
    let config = AddonConfig::from_json(&text)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    log::debug!(
        "Loaded addon config for {} v{} from {}",
        config.info.name,
        config.info.version,
        path.display()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "info": {
            "name": "My Plugin",
            "version": "1.2.0",
            "description": "Does things",
            "authors": [{"name": "Ada", "discord_id": "42", "github_username": "ada"}],
            "github": "https://github.com/ada/my-plugin"
        },
        "main": "index.js",
        "build": {"zlibrary": true, "release": {"public": false, "source": false}},
        "changelog": [{"title": "Fixed", "type": "fixed", "items": ["A crash"]}],
        "defaultConfig": [{"id": "enabled", "value": true}]
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = AddonConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.info.name, "My Plugin");
        assert_eq!(config.main_file(), "index.js");
        assert!(config.build.zlibrary);
        assert!(!config.build.production);
        assert_eq!(config.changelog[0].kind.as_deref(), Some("fixed"));
        assert!(config.extra.contains_key("defaultConfig"));
        assert_eq!(config.author_names(), "Ada");
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = AddonConfig::from_json(r#"{"info": {"name": "  "}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_main_defaults_to_index() {
        let config = AddonConfig::from_json(r#"{"info": {"name": "A"}, "main": ""}"#).unwrap();
        assert_eq!(config.main_file(), DEFAULT_MAIN);
    }

    #[test]
    fn test_release_options_defaults() {
        let config =
            AddonConfig::from_json(r#"{"info": {"name": "A"}, "build": {"release": {}}}"#).unwrap();
        let release = config.release_options().unwrap();
        assert!(!release.public);
        assert!(release.readme);
        assert!(release.source);
    }

    #[test]
    fn test_release_must_be_object() {
        let config =
            AddonConfig::from_json(r#"{"info": {"name": "A"}, "build": {"release": true}}"#)
                .unwrap();
        let err = config.release_options().unwrap_err();
        assert!(matches!(err, Error::InvalidReleaseConfig(_)));
        assert!(err.to_string().contains("a boolean"));

        let missing = AddonConfig::from_json(r#"{"info": {"name": "A"}}"#).unwrap();
        assert!(matches!(
            missing.release_options(),
            Err(Error::InvalidReleaseConfig(_))
        ));
    }

    #[test]
    fn test_pretty_json_keeps_unknown_keys_and_tabs() {
        let config = AddonConfig::from_json(SAMPLE).unwrap();
        let json = config.to_pretty_json().unwrap();
        assert!(json.contains("\n\t\"info\": {"));
        assert!(json.contains("\"defaultConfig\""));
        assert!(json.contains("\"github_username\": \"ada\""));
    }

    #[tokio::test]
    async fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ADDON_CONFIG_FILE), SAMPLE).unwrap();
        let config = load_addon_config(dir.path()).await.unwrap();
        assert_eq!(config.info.version, "1.2.0");

        let missing = tempfile::tempdir().unwrap();
        assert!(load_addon_config(missing.path()).await.is_err());
    }
}
