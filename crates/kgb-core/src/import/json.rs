//! Strict JSON import and the JSON export format.
//!
//! A payload is accepted only as a whole: one bad element rejects the file.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::ImportError;
use crate::model::EmployeeRecord;

/// Fields every element must carry as a non-empty string.
const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "position", "nip", "lastKGBDate"];

/// Parse and validate a JSON array of employee records.
pub fn records_from_json(content: &str) -> Result<Vec<EmployeeRecord>, ImportError> {
    let value: Value = serde_json::from_str(content)?;
    let items = value.as_array().ok_or(ImportError::NotAnArray)?;

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let object = item.as_object().ok_or_else(|| ImportError::InvalidRecord {
            index,
            message: "not an object".into(),
        })?;

        for field in REQUIRED_FIELDS {
            match object.get(field) {
                Some(Value::String(s)) if !s.trim().is_empty() => {}
                Some(Value::String(_)) => {
                    return Err(ImportError::InvalidRecord {
                        index,
                        message: format!("field '{field}' is empty"),
                    })
                }
                Some(_) => {
                    return Err(ImportError::InvalidRecord {
                        index,
                        message: format!("field '{field}' must be a string"),
                    })
                }
                None => {
                    return Err(ImportError::InvalidRecord {
                        index,
                        message: format!("missing field '{field}'"),
                    })
                }
            }
        }

        let record: EmployeeRecord =
            serde_json::from_value(item.clone()).map_err(|e| ImportError::InvalidRecord {
                index,
                message: e.to_string(),
            })?;
        records.push(record);
    }

    validate_records(&records)?;
    Ok(records)
}

/// Check the collection invariants: required fields non-blank, ids unique.
pub fn validate_records(records: &[EmployeeRecord]) -> Result<(), ImportError> {
    let mut seen = HashSet::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let fields = [
            ("id", &record.id),
            ("name", &record.name),
            ("position", &record.position),
            ("nip", &record.nip),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ImportError::InvalidRecord {
                index,
                message: format!("field '{field}' is empty"),
            });
        }
        if !seen.insert(record.id.as_str()) {
            return Err(ImportError::DuplicateId(record.id.clone()));
        }
    }
    Ok(())
}

/// Pretty-printed JSON array, the export and persistence format.
pub fn records_to_json(records: &[EmployeeRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewStatus;
    use chrono::NaiveDate;

    fn record(id: &str, name: &str) -> EmployeeRecord {
        EmployeeRecord {
            id: id.into(),
            name: name.into(),
            position: "Staff".into(),
            nip: format!("nip-{id}"),
            last_review_date: NaiveDate::from_ymd_opt(2022, 5, 1).unwrap(),
            review_status: ReviewStatus::InProgress,
        }
    }

    #[test]
    fn export_then_import_is_identity() {
        let records = vec![record("b", "Budi"), record("a", "Ani"), record("c", "Citra")];
        let json = records_to_json(&records).unwrap();
        let back = records_from_json(&json).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn rejects_non_array_payloads() {
        assert!(matches!(
            records_from_json(r#"{"id":"a"}"#),
            Err(ImportError::NotAnArray)
        ));
        assert!(matches!(records_from_json("not json"), Err(ImportError::Json(_))));
    }

    #[test]
    fn one_bad_element_rejects_everything() {
        let json = r#"[
            {"id":"a","name":"Ani","position":"Staff","nip":"1","lastKGBDate":"2022-01-01"},
            {"id":"b","name":"","position":"Staff","nip":"2","lastKGBDate":"2022-01-01"}
        ]"#;
        let err = records_from_json(json).unwrap_err();
        assert!(matches!(err, ImportError::InvalidRecord { index: 1, .. }), "got: {err}");
    }

    #[test]
    fn missing_date_and_bad_date_are_rejected() {
        let missing = r#"[{"id":"a","name":"Ani","position":"Staff","nip":"1"}]"#;
        assert!(records_from_json(missing)
            .unwrap_err()
            .to_string()
            .contains("lastKGBDate"));

        let bad = r#"[{"id":"a","name":"Ani","position":"Staff","nip":"1","lastKGBDate":"soon"}]"#;
        assert!(matches!(
            records_from_json(bad),
            Err(ImportError::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let records = vec![record("a", "Ani"), record("a", "Ana")];
        let json = records_to_json(&records).unwrap();
        assert!(matches!(
            records_from_json(&json),
            Err(ImportError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(records_from_json("[]").unwrap().is_empty());
    }
}
