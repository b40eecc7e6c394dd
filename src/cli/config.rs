//! Config command - show the effective package configuration

use crate::config::{load_project_config, CONFIG_FILE_NAMES};
use anyhow::Result;
use std::path::Path;

/// Print which config files exist and the merged configuration as TOML
pub fn run(path: &Path) -> Result<()> {
    let config = load_project_config(path);

    println!("📁 Config paths:");
    for name in CONFIG_FILE_NAMES {
        let status = if path.join(name).exists() {
            "✓"
        } else {
            "(not found)"
        };
        println!("  {} {}", path.join(name).display(), status);
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
