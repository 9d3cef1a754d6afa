//! The `kgb export` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Datelike;
use clap::ValueEnum;

use kgb_core::cycle::today;
use kgb_report::{
    default_json_file_name, default_sheet_file_name, write_json_export, write_sheet_export,
    YearRange,
};

use super::{Context, GlobalArgs};

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Pretty-printed JSON array, re-importable with `kgb import`.
    Json,
    /// Year-matrix CSV sheet with the review month per year.
    Sheet,
}

pub fn execute(
    global: &GlobalArgs,
    format: ExportFormat,
    output: Option<PathBuf>,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Result<()> {
    let ctx = Context::load(global)?;
    let store = ctx.open_store()?;
    let today = today();

    let path = match format {
        ExportFormat::Json => {
            let path = output.unwrap_or_else(|| PathBuf::from(default_json_file_name(today)));
            write_json_export(store.records(), &path)?;
            path
        }
        ExportFormat::Sheet => {
            let range = YearRange::from_options(start_year, end_year, today.year())?;
            let path = output.unwrap_or_else(|| PathBuf::from(default_sheet_file_name(&range)));
            write_sheet_export(store.records(), store.cycle(), &range, &path)?;
            path
        }
    };

    println!("Exported {} employees to {}", store.len(), path.display());
    Ok(())
}
