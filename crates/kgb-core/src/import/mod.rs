//! Employee list importers.
//!
//! Sheets come in two real-world layouts, each handled by its own
//! strategy:
//!
//! - [`year_matrix`]: one column per calendar year, a month token in the
//!   year an increase happened (`"Mar"`), `0` otherwise.
//! - [`date_column`]: a single literal date column.
//!
//! [`json`] handles the strict JSON export format.

pub mod date_column;
pub mod json;
pub mod sheet;
pub mod year_matrix;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ImportError;
use crate::model::{EmployeeRecord, ReviewStatus};

pub use sheet::{import_table, load_sheet, read_csv_str};

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    /// A typed numeric cell (e.g. a date serial from a spreadsheet library).
    Number(f64),
}

impl Cell {
    /// Classify raw text from a CSV field. CSV has no types, so anything
    /// non-blank stays text; long NIPs would lose digits as floats.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(t) => t.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Text form of the cell. Integral numbers print without a decimal part.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(t) => Cow::Borrowed(t.trim()),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Cow::Owned(format!("{n:.0}"))
            }
            Cell::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::from_raw(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// A sheet: a header row plus data rows. Rows may be ragged.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table whose first row is the header row.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, ImportError> {
        let mut iter = rows.into_iter();
        let header_row = iter.next().ok_or(ImportError::EmptySheet)?;
        let headers = header_row
            .iter()
            .map(|c| c.as_text().into_owned())
            .collect();
        Ok(Self {
            headers,
            rows: iter.collect(),
        })
    }

    /// Build a table from plain strings (useful for testing).
    pub fn from_text_rows<R, C>(rows: impl IntoIterator<Item = R>) -> Result<Self, ImportError>
    where
        R: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(|c| Cell::from_raw(c.as_ref())).collect())
            .collect();
        Self::from_rows(rows)
    }

    /// Headers trimmed and lowercased for matching.
    pub fn normalized_headers(&self) -> Vec<String> {
        self.headers.iter().map(|h| normalize_header(h)).collect()
    }
}

/// Trim, strip a byte-order mark, lowercase.
pub fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Which sheet layout to expect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportStrategy {
    /// Year-matrix if any 4-digit year header exists, else date-column.
    #[default]
    Auto,
    YearMatrix,
    DateColumn,
}

impl fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStrategy::Auto => write!(f, "auto"),
            ImportStrategy::YearMatrix => write!(f, "year-matrix"),
            ImportStrategy::DateColumn => write!(f, "date-column"),
        }
    }
}

impl FromStr for ImportStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "auto" => Ok(ImportStrategy::Auto),
            "year-matrix" | "matrix" => Ok(ImportStrategy::YearMatrix),
            "date-column" | "date" => Ok(ImportStrategy::DateColumn),
            other => Err(format!("unknown import strategy: {other}")),
        }
    }
}

/// Why a data row produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(&'static str),
    NoReviewMonth,
    UnparseableDate(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(label) => write!(f, "{label} is empty"),
            SkipReason::NoReviewMonth => write!(f, "no month found in any year column"),
            SkipReason::UnparseableDate(raw) => write!(f, "unrecognized date '{raw}'"),
        }
    }
}

/// A data row left out of the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based row number in the sheet, header included.
    pub row: usize,
    pub reason: SkipReason,
}

/// Records produced by a sheet import.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub records: Vec<EmployeeRecord>,
    pub skipped: Vec<SkippedRow>,
    /// The strategy that actually ran (never `Auto`).
    pub strategy: ImportStrategy,
}

/// A column the importers look for.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnSpec {
    /// Name used in error messages.
    pub label: &'static str,
    /// Lowercase header fragments that identify the column.
    pub variants: &'static [&'static str],
}

pub(crate) const NAME_COLUMN: ColumnSpec = ColumnSpec {
    label: "NAMA",
    variants: &["nama", "name"],
};

pub(crate) const POSITION_COLUMN: ColumnSpec = ColumnSpec {
    label: "JABATAN",
    variants: &["jabatan", "position"],
};

pub(crate) const NIP_COLUMN: ColumnSpec = ColumnSpec {
    label: "NIP",
    variants: &["nip", "national id", "nationalid"],
};

/// Indices of the name, position and NIP columns.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequiredColumns {
    pub name: usize,
    pub position: usize,
    pub nip: usize,
}

pub(crate) fn find_column(headers: &[String], spec: &ColumnSpec) -> Option<usize> {
    headers
        .iter()
        .position(|h| spec.variants.iter().any(|v| h.contains(v)))
}

/// Resolve every column against normalized headers, or fail naming all the
/// columns that are missing.
pub(crate) fn resolve_columns(
    headers: &[String],
    specs: &[ColumnSpec],
) -> Result<Vec<usize>, ImportError> {
    let mut found = Vec::with_capacity(specs.len());
    let mut missing = Vec::new();
    for spec in specs {
        match find_column(headers, spec) {
            Some(idx) => found.push(idx),
            None => missing.push(spec.label.to_string()),
        }
    }
    if missing.is_empty() {
        Ok(found)
    } else {
        Err(ImportError::MissingColumns { columns: missing })
    }
}

pub(crate) fn resolve_required(headers: &[String]) -> Result<RequiredColumns, ImportError> {
    let idx = resolve_columns(headers, &[NAME_COLUMN, POSITION_COLUMN, NIP_COLUMN])?;
    Ok(RequiredColumns {
        name: idx[0],
        position: idx[1],
        nip: idx[2],
    })
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Cell `idx` of a ragged row; missing trailing cells read as empty.
pub(crate) fn cell_at(row: &[Cell], idx: usize) -> &Cell {
    row.get(idx).unwrap_or(&EMPTY_CELL)
}

pub(crate) fn row_is_blank(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_empty)
}

/// NIPs often arrive as `'1980...` or `"1980..."` to stop spreadsheets
/// from turning them into floats.
pub fn clean_nip(cell: &Cell) -> String {
    cell.as_text()
        .chars()
        .filter(|c| *c != '\'' && *c != '"')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Name, position and NIP of a row, or why the row cannot be used.
pub(crate) fn identity_fields(
    row: &[Cell],
    cols: &RequiredColumns,
) -> Result<(String, String, String), SkipReason> {
    let name = cell_at(row, cols.name).as_text().into_owned();
    if name.is_empty() {
        return Err(SkipReason::MissingField(NAME_COLUMN.label));
    }
    let position = cell_at(row, cols.position).as_text().into_owned();
    if position.is_empty() {
        return Err(SkipReason::MissingField(POSITION_COLUMN.label));
    }
    let nip = clean_nip(cell_at(row, cols.nip));
    if nip.is_empty() {
        return Err(SkipReason::MissingField(NIP_COLUMN.label));
    }
    Ok((name, position, nip))
}

/// A freshly imported record: new id, status NotSubmitted.
pub(crate) fn new_record(
    name: String,
    position: String,
    nip: String,
    last_review_date: NaiveDate,
) -> EmployeeRecord {
    EmployeeRecord {
        id: Uuid::new_v4().to_string(),
        name,
        position,
        nip,
        last_review_date,
        review_status: ReviewStatus::NotSubmitted,
    }
}

const MONTH_TOKENS: &[(&str, u32)] = &[
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("mei", 5),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("agu", 8),
    ("agt", 8),
    ("ags", 8),
    ("aug", 8),
    ("sep", 9),
    ("okt", 10),
    ("oct", 10),
    ("nov", 11),
    ("des", 12),
    ("dec", 12),
];

/// Month tokens written by the sheet exporter, January first.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Month number (1-12) for text starting with a known 3-letter month
/// token: `"Mar"`, `"maret"` and `"MAR 2023"` all give 3.
pub fn month_from_token(text: &str) -> Option<u32> {
    let prefix: String = text.trim().chars().take(3).collect::<String>().to_lowercase();
    if prefix.chars().count() != 3 || !prefix.chars().all(char::is_alphabetic) {
        return None;
    }
    MONTH_TOKENS
        .iter()
        .find(|(token, _)| *token == prefix)
        .map(|(_, month)| *month)
}

/// The exporter's token for month 1-12.
pub fn month_abbreviation(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_ABBREVIATIONS.get(idx).copied()
}
