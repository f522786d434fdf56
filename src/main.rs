//! Addon bundler - assembles and packages compiled plugin addons.
//!
//! This binary compiles one addon and writes a single distributable
//! `.plugin.js` file, optionally producing a release or installing it.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match addon_bundler::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            1
        }
    };

    process::exit(exit_code);
}
