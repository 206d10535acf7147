//! `deployline plan` - Show what a batch would do
//!
//! Resolves the operation for every computer without contacting any of them.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use deployline::deploy::{BatchConfig, Location, resolve};
use deployline::infrastructure::Settings;

/// Renders one line per target: name, location, operation and path
#[must_use]
pub fn render_plan(config: &BatchConfig, source_is_dir: bool) -> String {
    let width = config
        .targets()
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for target in config.targets() {
        let location = Location::for_target(target);
        let line = match resolve(location, config.mode(), config.file()) {
            Ok(operation) => format!(
                "{operation} {}",
                config.invocation_path(target, config.copy_source_items(), source_is_dir)
            ),
            Err(e) => format!("error: {e}"),
        };
        let _ = writeln!(out, "{target:<width$}  {line}");
    }
    out
}

/// Loads a settings file and prints its plan
pub fn print_plan(file: &Path) -> Result<()> {
    let config = Settings::load(file)
        .and_then(Settings::into_batch_config)
        .with_context(|| format!("Invalid settings: {}", file.display()))?;

    let source_is_dir = std::fs::metadata(config.source_path()).is_ok_and(|m| m.is_dir());
    print!("{}", render_plan(&config, source_is_dir));
    Ok(())
}
