//! Year-matrix sheet export.
//!
//! One row per employee, one column per year. A year cell holds the month
//! token of the review that falls in that year on the employee's cycle, or
//! `0` when there is none. The layout matches what the year-matrix importer
//! reads, so an export can be re-imported.

use std::path::Path;

use chrono::Datelike;

use kgb_core::cycle::{review_dates_in_range, CycleConfig};
use kgb_core::import::month_abbreviation;
use kgb_core::model::EmployeeRecord;

use crate::error::ExportError;

/// Earliest year accepted in an export range.
pub const MIN_EXPORT_YEAR: i32 = 2000;
/// How far past the current year a range may reach.
pub const MAX_YEARS_AHEAD: i32 = 20;
/// Width of the default range after the current year.
pub const DEFAULT_SPAN_YEARS: i32 = 5;

/// An inclusive, validated range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Both years must lie in `2000..=current_year + 20` and `end >= start`.
    pub fn new(start: i32, end: i32, current_year: i32) -> Result<Self, ExportError> {
        let max = current_year + MAX_YEARS_AHEAD;
        for year in [start, end] {
            if !(MIN_EXPORT_YEAR..=max).contains(&year) {
                return Err(ExportError::YearOutOfRange {
                    year,
                    min: MIN_EXPORT_YEAR,
                    max,
                });
            }
        }
        if end < start {
            return Err(ExportError::ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// `current_year..=current_year + 5`
    pub fn default_for(current_year: i32) -> Self {
        Self {
            start: current_year,
            end: current_year + DEFAULT_SPAN_YEARS,
        }
    }

    /// Resolve optional CLI inputs: a missing start defaults to the current
    /// year, a missing end to five years after the start.
    pub fn from_options(
        start: Option<i32>,
        end: Option<i32>,
        current_year: i32,
    ) -> Result<Self, ExportError> {
        let start = start.unwrap_or(current_year);
        let end = end.unwrap_or(start + DEFAULT_SPAN_YEARS);
        Self::new(start, end, current_year)
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

/// `kgb-schedule-<start>-<end>.csv`
pub fn default_sheet_file_name(range: &YearRange) -> String {
    format!("kgb-schedule-{}-{}.csv", range.start, range.end)
}

/// The cells of one employee row, year columns only.
fn year_cells(record: &EmployeeRecord, cycle: &CycleConfig, range: &YearRange) -> Vec<String> {
    let dates = review_dates_in_range(record.last_review_date, cycle, range.start, range.end);
    range
        .years()
        .map(|year| {
            dates
                .iter()
                .find(|d| d.year() == year)
                .and_then(|d| month_abbreviation(d.month()))
                .unwrap_or("0")
                .to_string()
        })
        .collect()
}

/// Render the sheet as CSV text.
pub fn generate_sheet(
    records: &[EmployeeRecord],
    cycle: &CycleConfig,
    range: &YearRange,
) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["No".to_string(), "NIP".to_string(), "NAMA".to_string()];
    header.extend(range.years().map(|y| y.to_string()));
    header.push("JABATAN".to_string());
    writer.write_record(&header)?;

    for (i, record) in records.iter().enumerate() {
        let mut row = vec![
            (i + 1).to_string(),
            record.nip.clone(),
            record.name.clone(),
        ];
        row.extend(year_cells(record, cycle, range));
        row.push(record.position.clone());
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write the sheet to `path`.
pub fn write_sheet_export(
    records: &[EmployeeRecord],
    cycle: &CycleConfig,
    range: &YearRange,
    path: &Path,
) -> Result<(), ExportError> {
    let content = generate_sheet(records, cycle, range)?;
    std::fs::write(path, content).map_err(|e| ExportError::io(path, e))?;
    tracing::info!(
        path = %path.display(),
        records = records.len(),
        start = range.start,
        end = range.end,
        "sheet export written"
    );
    Ok(())
}
