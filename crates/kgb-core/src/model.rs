//! Core data model types for kgb-assistant.
//!
//! Field and status names on the wire follow the `kgb-assistant` JSON
//! export format (`lastKGBDate`, Indonesian status labels).

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One employee tracked for periodic salary-step increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Opaque unique identifier, assigned at creation.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Position ("jabatan").
    pub position: String,
    /// National employee id number.
    pub nip: String,
    /// Date of the last salary-step increase.
    #[serde(rename = "lastKGBDate", deserialize_with = "deserialize_review_date")]
    pub last_review_date: NaiveDate,
    /// Where the next increase is in the approval pipeline.
    #[serde(rename = "kgbStatus", default)]
    pub review_status: ReviewStatus,
}

/// Payload for adding a new employee. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub position: String,
    pub nip: String,
    pub last_review_date: NaiveDate,
    #[serde(default)]
    pub review_status: ReviewStatus,
}

/// Partial update applied to every record selected for a bulk edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub nip: Option<String>,
    #[serde(default)]
    pub last_review_date: Option<NaiveDate>,
    #[serde(default)]
    pub review_status: Option<ReviewStatus>,
}

impl RecordPatch {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.position.is_none()
            && self.nip.is_none()
            && self.last_review_date.is_none()
            && self.review_status.is_none()
    }

    /// Overwrite the fields this patch sets.
    pub fn apply_to(&self, record: &mut EmployeeRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(position) = &self.position {
            record.position = position.clone();
        }
        if let Some(nip) = &self.nip {
            record.nip = nip.clone();
        }
        if let Some(date) = self.last_review_date {
            record.last_review_date = date;
        }
        if let Some(status) = self.review_status {
            record.review_status = status;
        }
    }
}

/// Approval state of an employee's next salary-step increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[default]
    #[serde(rename = "Belum Diajukan")]
    NotSubmitted,
    #[serde(rename = "Sudah Diajukan")]
    Submitted,
    #[serde(rename = "Proses")]
    InProgress,
    #[serde(rename = "Menunggu Konfirmasi")]
    AwaitingConfirmation,
    #[serde(rename = "Selesai")]
    Completed,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 5] = [
        ReviewStatus::NotSubmitted,
        ReviewStatus::Submitted,
        ReviewStatus::InProgress,
        ReviewStatus::AwaitingConfirmation,
        ReviewStatus::Completed,
    ];

    /// Label used in stored JSON and exported files.
    pub fn label(&self) -> &'static str {
        match self {
            ReviewStatus::NotSubmitted => "Belum Diajukan",
            ReviewStatus::Submitted => "Sudah Diajukan",
            ReviewStatus::InProgress => "Proses",
            ReviewStatus::AwaitingConfirmation => "Menunggu Konfirmasi",
            ReviewStatus::Completed => "Selesai",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "belum diajukan" | "not submitted" | "notsubmitted" => Ok(ReviewStatus::NotSubmitted),
            "sudah diajukan" | "submitted" => Ok(ReviewStatus::Submitted),
            "proses" | "in progress" | "inprogress" => Ok(ReviewStatus::InProgress),
            "menunggu konfirmasi" | "awaiting confirmation" | "awaitingconfirmation" => {
                Ok(ReviewStatus::AwaitingConfirmation)
            }
            "selesai" | "completed" | "done" => Ok(ReviewStatus::Completed),
            other => Err(format!("unknown review status: {other}")),
        }
    }
}

/// Parse a stored review date.
///
/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps; for timestamps only
/// the calendar date as written is kept.
pub fn parse_review_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    // "2023-03-01T00:00:00" without an offset
    s.get(..10)
        .filter(|_| s.as_bytes().get(10) == Some(&b'T'))
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}

fn deserialize_review_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_review_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid lastKGBDate: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmployeeRecord {
        EmployeeRecord {
            id: "e-1".into(),
            name: "Siti Rahma".into(),
            position: "Analis Kepegawaian".into(),
            nip: "198001012005012001".into(),
            last_review_date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            review_status: ReviewStatus::Submitted,
        }
    }

    #[test]
    fn wire_names_match_stored_format() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["lastKGBDate"], "2023-03-01");
        assert_eq!(json["kgbStatus"], "Sudah Diajukan");
        assert_eq!(json["nip"], "198001012005012001");
    }

    #[test]
    fn reads_iso_timestamps_and_missing_status() {
        let json = r#"{
            "id": "x",
            "name": "Budi",
            "position": "Staff",
            "nip": "1",
            "lastKGBDate": "2022-07-01T00:00:00.000Z"
        }"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            record.last_review_date,
            NaiveDate::from_ymd_opt(2022, 7, 1).unwrap()
        );
        assert_eq!(record.review_status, ReviewStatus::NotSubmitted);
    }

    #[test]
    fn rejects_garbage_dates() {
        let json = r#"{"id":"x","name":"a","position":"b","nip":"1","lastKGBDate":"soon"}"#;
        assert!(serde_json::from_str::<EmployeeRecord>(json).is_err());
    }

    #[test]
    fn status_parse_accepts_both_languages() {
        assert_eq!(
            "Selesai".parse::<ReviewStatus>().unwrap(),
            ReviewStatus::Completed
        );
        assert_eq!(
            "in-progress".parse::<ReviewStatus>().unwrap(),
            ReviewStatus::InProgress
        );
        assert_eq!(
            "awaiting_confirmation".parse::<ReviewStatus>().unwrap(),
            ReviewStatus::AwaitingConfirmation
        );
        assert!("archived".parse::<ReviewStatus>().is_err());
    }

    #[test]
    fn patch_overwrites_only_set_fields() {
        let mut record = sample();
        let patch = RecordPatch {
            position: Some("Kepala Seksi".into()),
            ..Default::default()
        };
        patch.apply_to(&mut record);
        assert_eq!(record.position, "Kepala Seksi");
        assert_eq!(record.name, "Siti Rahma");
        assert!(!patch.is_empty());
        assert!(RecordPatch::default().is_empty());
    }
}
