//! The `kgb import` command.
//!
//! A `.json` file is a strict export and replaces the collection only if
//! every record is valid. Anything else is read as a CSV sheet; rows that
//! cannot be used are reported and left out.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use kgb_core::import::{import_table, load_sheet, ImportStrategy};

use super::{is_json_path, take, Context, GlobalArgs};

pub fn execute(global: &GlobalArgs, file: PathBuf, strategy: Option<ImportStrategy>) -> Result<()> {
    let ctx = Context::load(global)?;

    // Read and parse everything before touching the store.
    if is_json_path(&file) {
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let mut store = ctx.open_store()?;
        let count = take(
            store
                .import_json(&content)
                .with_context(|| format!("failed to import {}", file.display()))?,
        );
        println!("Imported {count} employees from {}", file.display());
        return Ok(());
    }

    let table = load_sheet(&file)?;
    let strategy = strategy.unwrap_or(ctx.config.import_strategy);
    let outcome = import_table(&table, strategy)
        .with_context(|| format!("failed to import {}", file.display()))?;

    for skipped in &outcome.skipped {
        eprintln!("Skipped row {}: {}", skipped.row, skipped.reason);
    }

    let mut store = ctx.open_store()?;
    let count = take(store.replace_all(outcome.records)?);
    println!(
        "Imported {count} employees from {} ({} layout, {} rows skipped)",
        file.display(),
        outcome.strategy,
        outcome.skipped.len()
    );
    Ok(())
}
