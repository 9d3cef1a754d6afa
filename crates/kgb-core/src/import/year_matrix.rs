//! Year-matrix sheet import.
//!
//! Layout: `NAMA | JABATAN | NIP | 2019 | 2021 | 2023 ...`, where a year cell
//! holds a month token (`"Mar"`) if an increase happened that year and `0`
//! otherwise. The most recent year with a month wins.

use chrono::NaiveDate;

use crate::error::ImportError;
use crate::import::{
    cell_at, identity_fields, Cell, month_from_token, new_record, resolve_required, row_is_blank,
    ImportOutcome, ImportStrategy, SkipReason, SkippedRow, Table,
};

/// `(column index, year)` for every header that is exactly a 4-digit year,
/// ascending by year.
pub fn year_columns(headers: &[String]) -> Vec<(usize, i32)> {
    let mut years: Vec<(usize, i32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| {
            let h = h.trim();
            if h.len() == 4 && h.bytes().all(|b| b.is_ascii_digit()) {
                h.parse().ok().map(|year| (idx, year))
            } else {
                None
            }
        })
        .collect();
    years.sort_by_key(|&(_, year)| year);
    years
}

/// Most recent review date encoded in one row, if any.
fn latest_review_date(row: &[Cell], years: &[(usize, i32)]) -> Option<NaiveDate> {
    years.iter().rev().find_map(|&(idx, year)| {
        let month = month_from_token(&cell_at(row, idx).as_text())?;
        NaiveDate::from_ymd_opt(year, month, 1)
    })
}

/// Parse a year-matrix table.
pub fn parse(table: &Table) -> Result<ImportOutcome, ImportError> {
    let headers = table.normalized_headers();
    let cols = resolve_required(&headers)?;
    let years = year_columns(&headers);
    if years.is_empty() {
        return Err(ImportError::NoYearColumns);
    }

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (i, row) in table.rows.iter().enumerate() {
        let row_number = i + 2;
        if row_is_blank(row) {
            continue;
        }

        let (name, position, nip) = match identity_fields(row, &cols) {
            Ok(fields) => fields,
            Err(reason) => {
                tracing::debug!(row = row_number, %reason, "skipping row");
                skipped.push(SkippedRow {
                    row: row_number,
                    reason,
                });
                continue;
            }
        };

        match latest_review_date(row, &years) {
            Some(date) => records.push(new_record(name, position, nip, date)),
            None => {
                tracing::debug!(row = row_number, nip = %nip, "no review month, row dropped");
                skipped.push(SkippedRow {
                    row: row_number,
                    reason: SkipReason::NoReviewMonth,
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
        strategy: ImportStrategy::YearMatrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewStatus;

    #[test]
    fn most_recent_year_with_a_month_wins() {
        let table = Table::from_text_rows([
            vec!["NAMA", "JABATAN", "NIP", "2022", "2023"],
            vec!["Jane", "Staff", "12345", "0", "Mar"],
        ])
        .unwrap();

        let outcome = parse(&table).unwrap();
        assert_eq!(outcome.records.len(), 1);
        let rec = &outcome.records[0];
        assert_eq!(rec.last_review_date, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
        assert_eq!(rec.name, "Jane");
        assert_eq!(rec.nip, "12345");
        assert_eq!(rec.review_status, ReviewStatus::NotSubmitted);
        assert_eq!(outcome.strategy, ImportStrategy::YearMatrix);
    }

    #[test]
    fn year_columns_are_sorted_regardless_of_sheet_order() {
        let table = Table::from_text_rows([
            vec!["No", "NIP", "NAMA", "2024", "2020", "2022", "JABATAN"],
            vec!["1", "'777", "Budi", "0", "Jul", "Okt", "Guru"],
        ])
        .unwrap();

        let outcome = parse(&table).unwrap();
        let rec = &outcome.records[0];
        assert_eq!(rec.last_review_date, NaiveDate::from_ymd_opt(2022, 10, 1).unwrap());
        assert_eq!(rec.nip, "777");
        assert_eq!(rec.position, "Guru");
    }

    #[test]
    fn rows_without_a_month_are_dropped_not_fatal() {
        let table = Table::from_text_rows([
            vec!["NAMA", "JABATAN", "NIP", "2023"],
            vec!["A", "Staff", "1", "0"],
            vec!["B", "Staff", "2", "Feb"],
            vec!["", "", "", ""],
            vec!["C", "Staff", "", "Jan"],
        ])
        .unwrap();

        let outcome = parse(&table).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].name, "B");
        assert_eq!(
            outcome.skipped,
            vec![
                SkippedRow {
                    row: 2,
                    reason: SkipReason::NoReviewMonth
                },
                SkippedRow {
                    row: 5,
                    reason: SkipReason::MissingField("NIP")
                },
            ]
        );
    }

    #[test]
    fn missing_nip_column_names_nip() {
        let table = Table::from_text_rows([
            vec!["NAMA", "JABATAN", "2023"],
            vec!["Jane", "Staff", "Mar"],
        ])
        .unwrap();

        let err = parse(&table).unwrap_err();
        assert!(err.to_string().contains("NIP"), "got: {err}");
    }

    #[test]
    fn no_year_columns_is_an_error() {
        let table =
            Table::from_text_rows([vec!["NAMA", "JABATAN", "NIP"], vec!["Jane", "Staff", "1"]])
                .unwrap();
        assert!(matches!(parse(&table), Err(ImportError::NoYearColumns)));
    }

    #[test]
    fn all_rows_unparseable_is_distinct_error() {
        let table = Table::from_text_rows([
            vec!["NAMA", "JABATAN", "NIP", "2023"],
            vec!["Jane", "Staff", "1", "0"],
        ])
        .unwrap();
        assert!(matches!(
            parse(&table),
            Err(ImportError::NoValidRows { skipped: 1 })
        ));
    }

    #[test]
    fn only_four_digit_headers_count_as_years() {
        let headers: Vec<String> = ["2023", "tahun 2024", "20245", "1999", "abcd"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(year_columns(&headers), vec![(3, 1999), (0, 2023)]);
    }
}
