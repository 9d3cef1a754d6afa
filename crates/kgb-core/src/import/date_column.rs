//! Literal date-column sheet import.
//!
//! Layout: name, position and NIP columns plus one column holding the last
//! increase date, either as text or as a spreadsheet date serial.

use chrono::{Days, NaiveDate};

use crate::error::ImportError;
use crate::import::{
    cell_at, find_column, identity_fields, month_from_token, new_record, resolve_columns,
    row_is_blank, Cell, ColumnSpec, ImportOutcome, ImportStrategy, RequiredColumns, SkipReason,
    SkippedRow, Table, NAME_COLUMN, NIP_COLUMN, POSITION_COLUMN,
};
use crate::model::parse_review_date;

pub(crate) const DATE_COLUMN: ColumnSpec = ColumnSpec {
    label: "TMT KGB",
    variants: &[
        "tmt kgb",
        "kgb terakhir",
        "last kgb",
        "lastkgbdate",
        "tanggal kgb",
        "tgl kgb",
        "last review",
    ],
};

/// Largest serial chrono can represent comfortably (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Index of the literal date column, if the sheet has one.
pub fn find_date_column(headers: &[String]) -> Option<usize> {
    find_column(headers, &DATE_COLUMN)
}

/// Decode a spreadsheet date serial (1900 date system). Values `<= 1` are
/// not treated as dates.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 1.0 || serial > MAX_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

/// Generic date text parsing: ISO, RFC 3339, day-first numeric forms and
/// `12 Mar 2023` / `12 Maret 2023`. Plain numbers are date serials.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(serial) = text.parse::<f64>() {
        return date_from_serial(serial);
    }
    if let Some(date) = parse_review_date(text) {
        return Some(date);
    }
    for format in ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    let parts: Vec<&str> = text.split_whitespace().collect();
    if let [day, month, year] = parts.as_slice() {
        let day: u32 = day.trim_end_matches(',').parse().ok()?;
        let month = month_from_token(month)?;
        let year: i32 = year.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    None
}

/// Date held in a cell, whatever its type.
pub fn parse_cell_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Empty => None,
        Cell::Number(serial) => date_from_serial(*serial),
        Cell::Text(text) => parse_date_text(text),
    }
}

/// Parse a date-column table.
pub fn parse(table: &Table) -> Result<ImportOutcome, ImportError> {
    let headers = table.normalized_headers();
    let idx = resolve_columns(
        &headers,
        &[NAME_COLUMN, POSITION_COLUMN, NIP_COLUMN, DATE_COLUMN],
    )?;
    let cols = RequiredColumns {
        name: idx[0],
        position: idx[1],
        nip: idx[2],
    };
    let date_idx = idx[3];

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (i, row) in table.rows.iter().enumerate() {
        let row_number = i + 2;
        if row_is_blank(row) {
            continue;
        }

        let outcome = identity_fields(row, &cols).and_then(|(name, position, nip)| {
            let cell = cell_at(row, date_idx);
            if cell.is_empty() {
                return Err(SkipReason::MissingField(DATE_COLUMN.label));
            }
            parse_cell_date(cell)
                .map(|date| new_record(name, position, nip, date))
                .ok_or_else(|| SkipReason::UnparseableDate(cell.as_text().into_owned()))
        });

        match outcome {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::debug!(row = row_number, %reason, "skipping row");
                skipped.push(SkippedRow {
                    row: row_number,
                    reason,
                });
            }
        }
    }

    if records.is_empty() {
        return Err(ImportError::NoValidRows {
            skipped: skipped.len(),
        });
    }

    Ok(ImportOutcome {
        records,
        skipped,
        strategy: ImportStrategy::DateColumn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serials_use_the_1900_date_system() {
        assert_eq!(date_from_serial(44986.0), Some(date(2023, 3, 1)));
        assert_eq!(date_from_serial(45000.75), Some(date(2023, 3, 15)));
        assert_eq!(date_from_serial(1.0), None);
        assert_eq!(date_from_serial(-3.0), None);
        assert_eq!(date_from_serial(f64::NAN), None);
    }

    #[test]
    fn text_formats() {
        assert_eq!(parse_date_text("2023-03-01"), Some(date(2023, 3, 1)));
        assert_eq!(parse_date_text("2023-03-01T00:00:00.000Z"), Some(date(2023, 3, 1)));
        assert_eq!(parse_date_text("01/03/2023"), Some(date(2023, 3, 1)));
        assert_eq!(parse_date_text("01-03-2023"), Some(date(2023, 3, 1)));
        assert_eq!(parse_date_text("1 Mei 2022"), Some(date(2022, 5, 1)));
        assert_eq!(parse_date_text("17 August 2021"), Some(date(2021, 8, 17)));
        assert_eq!(parse_date_text("44986"), Some(date(2023, 3, 1)));
        assert_eq!(parse_date_text("sometime"), None);
        assert_eq!(parse_date_text("31/02/2023"), None);
    }

    #[test]
    fn typed_number_cells_are_serials() {
        assert_eq!(parse_cell_date(&Cell::Number(44986.0)), Some(date(2023, 3, 1)));
        assert_eq!(parse_cell_date(&Cell::Empty), None);
    }

    #[test]
    fn parses_rows_and_reports_bad_dates() {
        let table = Table::from_text_rows([
            vec!["Nama", "Jabatan", "NIP", "TMT KGB Terakhir"],
            vec!["Rina", "Staff", "'111", "2022-04-01"],
            vec!["Tono", "Guru", "222", "kemarin"],
            vec!["Ujang", "Guru", "333", ""],
        ])
        .unwrap();

        let outcome = parse(&table).unwrap();
        assert_eq!(outcome.strategy, ImportStrategy::DateColumn);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].nip, "111");
        assert_eq!(outcome.records[0].last_review_date, date(2022, 4, 1));
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::UnparseableDate("kemarin".into())
        );
        assert_eq!(outcome.skipped[1].reason, SkipReason::MissingField("TMT KGB"));
    }

    #[test]
    fn missing_date_column_is_reported_with_other_columns() {
        let table = Table::from_text_rows([vec!["Nama", "NIP"], vec!["Rina", "1"]]).unwrap();
        let err = parse(&table).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("JABATAN"), "got: {msg}");
        assert!(msg.contains("TMT KGB"), "got: {msg}");
    }
}
