//! The `kgb init` command.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use kgb_providers::config::{CONFIG_FILE_NAME, STARTER_CONFIG};

use super::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let config_path = global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    if config_path.exists() {
        println!("{} already exists, skipping.", config_path.display());
    } else {
        std::fs::write(&config_path, STARTER_CONFIG)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!("Created {}", config_path.display());
    }

    let data_dir = global
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("kgb-data"));
    if !Path::new(&data_dir).exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        println!("Created {}/", data_dir.display());
    }

    println!("\nNext steps:");
    println!("  1. Set OPENAI_API_KEY or ANTHROPIC_API_KEY for `kgb suggest`");
    println!("  2. Run: kgb import roster.csv");
    println!("  3. Run: kgb reviews");

    Ok(())
}
