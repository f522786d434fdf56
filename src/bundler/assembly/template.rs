//! Plugin-library wrapper template.
//!
//! Renders the self-registering wrapper using Handlebars with escaping turned
//! off, so compiled code and JSON are inserted byte for byte. This is
//! independent from the bracket placeholders used for output paths.

use crate::bundler::error::{Error, Result};
use handlebars::Handlebars;
use std::collections::BTreeMap;

/// Name the wrapper template is registered under.
const TEMPLATE_NAME: &str = "plugin.wrapper";

/// Built-in wrapper.
///
/// `pluginConfig` receives the serialized addon config and `builtCode` the
/// module-injected compiler output, which assigns its exports to
/// `module.exports.LibraryPluginHack`.
pub const PLUGIN_WRAPPER_TEMPLATE: &str = r#"module.exports = (() => {
	const config = {{pluginConfig}};
	return !global.ZeresPluginLibrary ? class {
		constructor() {this._config = config;}
		getName() {return config.info.name;}
		getAuthor() {return config.info.authors.map(a => a.name).join(", ");}
		getDescription() {return config.info.description;}
		getVersion() {return config.info.version;}
		load() {
			BdApi.showConfirmationModal("Library Missing", `The library plugin needed for ${config.info.name} is missing. Please click Download Now to install it.`, {
				confirmText: "Download Now",
				cancelText: "Cancel",
				onConfirm: () => {
					require("request").get("https://rauenzi.github.io/BDPluginLibrary/release/0PluginLibrary.plugin.js", async (error, response, body) => {
						if (error) return require("electron").shell.openExternal("https://betterdiscord.app/Download?id=9");
						await new Promise(r => require("fs").writeFile(require("path").join(BdApi.Plugins.folder, "0PluginLibrary.plugin.js"), body, r));
					});
				}
			});
		}
		start() {}
		stop() {}
	} : (([Plugin, Api]) => {
		const plugin = (Plugin, Library) => {
			const module = {exports: {}};
{{builtCode}}
			const exported = module.exports.LibraryPluginHack;
			return (exported.default ?? exported)(Plugin, Library);
		};
		return plugin(Plugin, Api);
	})(global.ZeresPluginLibrary.buildPlugin(config));
})();"#;

/// Renders the wrapper around `built_code`.
///
/// `template` overrides [`PLUGIN_WRAPPER_TEMPLATE`] when given.
pub fn render_wrapper(
    template: Option<&str>,
    plugin_config_json: &str,
    built_code: &str,
) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string(TEMPLATE_NAME, template.unwrap_or(PLUGIN_WRAPPER_TEMPLATE))
        .map_err(|e| Error::GenericError(format!("failed to register wrapper template: {}", e)))?;

    let mut data = BTreeMap::new();
    data.insert("pluginConfig", plugin_config_json);
    data.insert("builtCode", built_code);

    Ok(handlebars.render(TEMPLATE_NAME, &data)?)
}
