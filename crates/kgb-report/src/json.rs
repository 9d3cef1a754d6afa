//! JSON export file.

use std::path::Path;

use chrono::NaiveDate;

use kgb_core::import::json::records_to_json;
use kgb_core::model::EmployeeRecord;

use crate::error::ExportError;

/// `kgb-data-export-YYYY-MM-DD.json`
pub fn default_json_file_name(today: NaiveDate) -> String {
    format!("kgb-data-export-{}.json", today.format("%Y-%m-%d"))
}

/// Write the collection as a pretty-printed JSON array.
pub fn write_json_export(records: &[EmployeeRecord], path: &Path) -> Result<(), ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let json = records_to_json(records)?;
    std::fs::write(path, json).map_err(|e| ExportError::io(path, e))?;
    tracing::info!(path = %path.display(), records = records.len(), "JSON export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgb_core::import::json::records_from_json;
    use kgb_core::model::ReviewStatus;

    fn records() -> Vec<EmployeeRecord> {
        vec![
            EmployeeRecord {
                id: "a1".into(),
                name: "Siti".into(),
                position: "Analis".into(),
                nip: "198001012005012001".into(),
                last_review_date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
                review_status: ReviewStatus::Submitted,
            },
            EmployeeRecord {
                id: "b2".into(),
                name: "Bambang".into(),
                position: "Pengawas".into(),
                nip: "197512312000031002".into(),
                last_review_date: NaiveDate::from_ymd_opt(2022, 10, 1).unwrap(),
                review_status: ReviewStatus::Completed,
            },
        ]
    }

    #[test]
    fn file_name_uses_export_date() {
        let day = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        assert_eq!(default_json_file_name(day), "kgb-data-export-2025-07-04.json");
    }

    #[test]
    fn written_file_reads_back_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        let records = records();

        write_json_export(&records, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"lastKGBDate\": \"2023-04-01\""));
        assert!(content.contains("\"kgbStatus\": \"Sudah Diajukan\""));
        assert_eq!(records_from_json(&content).unwrap(), records);
    }

    #[test]
    fn empty_collection_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        let err = write_json_export(&[], &path).unwrap_err();
        assert_eq!(err.to_string(), "no employee data to export");
        assert!(!path.exists());
    }
}
