//! Reading sheets from CSV and dispatching to an import strategy.

use std::path::Path;

use anyhow::{Context, Result};

use crate::error::ImportError;
use crate::import::{date_column, year_matrix, Cell, ImportOutcome, ImportStrategy, Table};

/// Spreadsheet CSV exports use `;` in locales with a decimal comma.
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Parse CSV text into a [`Table`]. The first record is the header row.
pub fn read_csv_str(content: &str) -> Result<Table, ImportError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(sniff_delimiter(content))
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::from_raw).collect());
    }
    Table::from_rows(rows)
}

/// Read a CSV sheet from disk.
pub fn load_sheet(path: &Path) -> Result<Table> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read sheet: {}", path.display()))?;
    read_csv_str(&content).with_context(|| format!("failed to parse sheet: {}", path.display()))
}

/// Run the requested strategy. `Auto` picks the year matrix when any
/// 4-digit year header exists, the date column when one is present, and
/// otherwise the year matrix so the error names what is missing.
pub fn import_table(table: &Table, strategy: ImportStrategy) -> Result<ImportOutcome, ImportError> {
    let resolved = match strategy {
        ImportStrategy::Auto => {
            let headers = table.normalized_headers();
            if !year_matrix::year_columns(&headers).is_empty() {
                ImportStrategy::YearMatrix
            } else if date_column::find_date_column(&headers).is_some() {
                ImportStrategy::DateColumn
            } else {
                ImportStrategy::YearMatrix
            }
        }
        other => other,
    };

    let outcome = match resolved {
        ImportStrategy::DateColumn => date_column::parse(table)?,
        _ => year_matrix::parse(table)?,
    };

    tracing::info!(
        strategy = %outcome.strategy,
        imported = outcome.records.len(),
        skipped = outcome.skipped.len(),
        "sheet parsed"
    );
    Ok(outcome)
}
