use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::config::{Config, CONFIG_FILE};

/// Write the default configuration into `dir`. An existing file is kept.
pub fn init(dir: &Path) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() {
        println!("{} {} already exists (skipping)", "!".yellow(), CONFIG_FILE);
        return Ok(());
    }

    let json = serde_json::to_string_pretty(&Config::default())?;
    std::fs::write(&config_path, format!("{}\n", json))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Created {} with default configuration",
        "✓".green(),
        CONFIG_FILE
    );
    Ok(())
}
