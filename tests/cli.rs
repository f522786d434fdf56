//! Binary-level tests for addon_bundler.
//!
//! The compiler is replaced by a `sh -c` script configured in `builder.toml`,
//! so the pipeline tests only run on unix.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn bundler_cmd(cwd: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("addon_bundler");
    cmd.arg("--cwd")
        .arg(cwd)
        .env("RUST_LOG", "info")
        .env_remove("RELEASE_FOLDER");
    cmd
}

/// Compiler stand-in: writes webpack-shaped output to `$1/$3` and prints stats.
const SUCCESS_SCRIPT: &str = r#"mkdir -p "$1" && printf '(() => {\nvar __webpack_exports__ = {};\nconst greeting = "hi";\nmodule.exports.LibraryPluginHack = __webpack_exports__;\n})();\n' > "$1/$3" && echo '{"errors":[],"warnings":[]}'"#;

const FAILURE_SCRIPT: &str =
    r#"echo '{"errors":[{"message":"Module not found: ./missing"}],"warnings":[]}'; exit 1"#;

/// Project with one plugin and a builder config that runs `script` as the compiler.
fn project(script: &str, addon_json: &str, install: bool) -> TempDir {
    let root = TempDir::new().unwrap();
    let addon_dir = root.path().join("plugins/MyPlugin");
    std::fs::create_dir_all(&addon_dir).unwrap();
    std::fs::write(addon_dir.join("config.json"), addon_json).unwrap();
    std::fs::write(addon_dir.join("index.js"), "export default class {}").unwrap();

    let builder = format!(
        "[paths]\nhost_folder = '{}'\n\n[build]\ninstall = {}\n\n[compiler]\nprogram = \"sh\"\nargs = [\"-c\", '''{}''']\n",
        root.path().join("host").display(),
        install,
        script
    );
    std::fs::write(root.path().join("builder.toml"), builder).unwrap();
    root
}

const ADDON: &str = r#"{"info": {"name": "My Plugin", "version": "1.0.0", "authors": [{"name": "Someone"}]}}"#;

#[test]
fn help_flag_works() {
    cargo_bin_cmd!("addon_bundler")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--plugin"));
}

#[test]
fn addon_selector_is_required() {
    cargo_bin_cmd!("addon_bundler")
        .arg("--build")
        .assert()
        .failure();
}

#[test]
fn theme_mode_fails_fast() {
    let root = TempDir::new().unwrap();
    bundler_cmd(root.path())
        .args(["--theme", "Dark"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Themes loader is not implemented yet.",
        ));
}

#[test]
fn missing_addon_config_fails() {
    let root = TempDir::new().unwrap();
    bundler_cmd(root.path())
        .args(["--plugin", "Ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config.json"));
}

#[cfg(unix)]
#[test]
fn plugin_build_writes_artifact() {
    let root = project(SUCCESS_SCRIPT, ADDON, false);

    bundler_cmd(root.path())
        .args(["--plugin", "MyPlugin"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Built in"));

    let artifact =
        std::fs::read_to_string(root.path().join("builds/MyPlugin.plugin.js")).unwrap();
    assert!(artifact.starts_with("/**\n * @name My Plugin\n * @author Someone\n * @version 1.0.0\n */\n"));
    assert!(artifact.contains("module.exports = __webpack_exports__.default ?? __webpack_exports__"));
    assert!(artifact.contains("\tconst greeting = \"hi\";"));
    assert!(!root.path().join("host/plugins").exists());
}

#[cfg(unix)]
#[test]
fn compile_failure_exits_non_zero() {
    let root = project(FAILURE_SCRIPT, ADDON, true);

    bundler_cmd(root.path())
        .args(["--plugin", "MyPlugin"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Module not found: ./missing"))
        .stderr(predicate::str::contains("Failed to build after"));

    assert!(!root.path().join("builds/MyPlugin.plugin.js").exists());
    assert!(!root.path().join("host/plugins").exists());
}

#[cfg(unix)]
#[test]
fn install_copies_into_host_folder() {
    let root = project(SUCCESS_SCRIPT, ADDON, true);

    bundler_cmd(root.path())
        .args(["--plugin", "MyPlugin"])
        .assert()
        .success();

    let built = std::fs::read(root.path().join("builds/MyPlugin.plugin.js")).unwrap();
    let installed = std::fs::read(root.path().join("host/plugins/MyPlugin.plugin.js")).unwrap();
    assert_eq!(built, installed);
}

#[cfg(unix)]
#[test]
fn public_release_uses_release_folder() {
    let addon = r#"{"info": {"name": "My Plugin", "version": "2.0.0"}, "build": {"release": {"public": true}}}"#;
    let root = project(SUCCESS_SCRIPT, addon, false);

    bundler_cmd(root.path())
        .args(["--plugin", "MyPlugin", "--release"])
        .env("RELEASE_FOLDER", root.path().join("public"))
        .assert()
        .success();

    let release = root.path().join("public/My Plugin");
    assert!(release.join("MyPlugin.plugin.js").exists());
    assert!(release.join("README.md").exists());
    assert!(release.join("src/config.json").exists());
    assert!(!root.path().join("releases").exists());
}

#[cfg(unix)]
#[test]
fn invalid_release_config_does_not_fail_run() {
    let addon = r#"{"info": {"name": "My Plugin"}, "build": {"release": "yes"}}"#;
    let root = project(SUCCESS_SCRIPT, addon, false);

    bundler_cmd(root.path())
        .args(["--plugin", "MyPlugin", "--release"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Release build failed!"));

    assert!(root.path().join("builds/MyPlugin.plugin.js").exists());
}
