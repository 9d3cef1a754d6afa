//! In-memory employee collection mirrored to a key-value backend.
//!
//! The in-memory list is authoritative. Every mutation rewrites the whole
//! list under [`STORAGE_KEY`]; a failed write comes back as a warning on
//! the [`Outcome`] and the mutation still stands.

use std::collections::HashSet;

use uuid::Uuid;

use crate::cycle::{complete_cycle, CycleConfig};
use crate::error::{StorageError, StoreError};
use crate::import::json::{records_from_json, records_to_json, validate_records};
use crate::model::{EmployeeRecord, NewEmployee, RecordPatch, ReviewStatus};
use crate::storage::{KeyValueStore, STORAGE_KEY};

/// Result of a store operation plus a possible persistence warning.
#[derive(Debug)]
#[must_use]
pub struct Outcome<T> {
    pub value: T,
    pub warning: Option<StorageError>,
}

impl<T> Outcome<T> {
    fn new(value: T, warning: Option<StorageError>) -> Self {
        Self { value, warning }
    }

    pub fn is_clean(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// The employee collection and its persistence mirror.
pub struct RecordStore<S: KeyValueStore> {
    backend: S,
    records: Vec<EmployeeRecord>,
    cycle: CycleConfig,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Load the collection from `backend`.
    ///
    /// Unreadable or malformed data is discarded and reported; the store
    /// then starts empty.
    pub fn open(backend: S, cycle: CycleConfig) -> Outcome<Self> {
        let (records, warning) = match backend.get(STORAGE_KEY) {
            Ok(None) => (Vec::new(), None),
            Ok(Some(raw)) => match records_from_json(&raw) {
                Ok(records) => {
                    tracing::debug!(count = records.len(), "loaded employee records");
                    (records, None)
                }
                Err(e) => {
                    tracing::warn!("discarding corrupted employee data: {e}");
                    let warning = StorageError::Corrupt {
                        key: STORAGE_KEY.to_string(),
                        message: e.to_string(),
                    };
                    (Vec::new(), Some(warning))
                }
            },
            Err(e) => {
                tracing::warn!("could not load employee data: {e}");
                (Vec::new(), Some(e))
            }
        };

        Outcome::new(
            Self {
                backend,
                records,
                cycle,
            },
            warning,
        )
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&EmployeeRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cycle(&self) -> &CycleConfig {
        &self.cycle
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Add a new employee with a freshly generated id.
    pub fn add(&mut self, new: NewEmployee) -> Result<Outcome<EmployeeRecord>, StoreError> {
        let name = required(&new.name, "name")?;
        let position = required(&new.position, "position")?;
        let nip = required(&new.nip, "nip")?;

        let record = EmployeeRecord {
            id: Uuid::new_v4().to_string(),
            name,
            position,
            nip,
            last_review_date: new.last_review_date,
            review_status: new.review_status,
        };
        self.records.push(record.clone());
        tracing::info!(id = %record.id, "employee added");
        Ok(Outcome::new(record, self.persist()))
    }

    /// Replace the record with the same id.
    ///
    /// Moving a record into Completed closes its cycle: the stored record
    /// gets the next review date and status NotSubmitted.
    pub fn update(
        &mut self,
        mut record: EmployeeRecord,
    ) -> Result<Outcome<EmployeeRecord>, StoreError> {
        record.name = required(&record.name, "name")?;
        record.position = required(&record.position, "position")?;
        record.nip = required(&record.nip, "nip")?;

        let cycle = self.cycle;
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;

        let previous = slot.review_status;
        *slot = settle(record, previous, &cycle);
        let updated = slot.clone();
        Ok(Outcome::new(updated, self.persist()))
    }

    /// Apply `patch` to every record whose id is in `ids`. Unknown ids are
    /// ignored. Returns the number of records changed.
    ///
    /// A patch that blanks a required field is rejected before any record
    /// changes.
    pub fn bulk_update(
        &mut self,
        ids: &[String],
        patch: &RecordPatch,
    ) -> Result<Outcome<usize>, StoreError> {
        let patch = trimmed_patch(patch)?;
        let selected: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let cycle = self.cycle;
        let mut changed = 0;

        for slot in self
            .records
            .iter_mut()
            .filter(|r| selected.contains(r.id.as_str()))
        {
            let previous = slot.review_status;
            let mut merged = slot.clone();
            patch.apply_to(&mut merged);
            *slot = settle(merged, previous, &cycle);
            changed += 1;
        }

        tracing::info!(changed, "bulk update applied");
        Ok(Outcome::new(changed, self.persist()))
    }

    /// Remove one record.
    pub fn delete(&mut self, id: &str) -> Result<Outcome<EmployeeRecord>, StoreError> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = self.records.remove(idx);
        Ok(Outcome::new(removed, self.persist()))
    }

    /// Remove every record whose id is in `ids`. Returns how many were removed.
    pub fn bulk_delete(&mut self, ids: &[String]) -> Outcome<usize> {
        let selected: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.records.len();
        self.records.retain(|r| !selected.contains(r.id.as_str()));
        let removed = before - self.records.len();
        tracing::info!(removed, "bulk delete applied");
        Outcome::new(removed, self.persist())
    }

    /// Replace the whole collection. The new list is validated first and
    /// rejected as a whole if any record is invalid.
    pub fn replace_all(&mut self, records: Vec<EmployeeRecord>) -> Result<Outcome<usize>, StoreError> {
        validate_records(&records)?;
        self.records = records;
        tracing::info!(count = self.records.len(), "collection replaced");
        Ok(Outcome::new(self.records.len(), self.persist()))
    }

    /// Replace the collection from a JSON export.
    pub fn import_json(&mut self, content: &str) -> Result<Outcome<usize>, StoreError> {
        let records = records_from_json(content)?;
        self.replace_all(records)
    }

    /// The collection as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        records_to_json(&self.records)
    }

    fn persist(&mut self) -> Option<StorageError> {
        let json = match records_to_json(&self.records) {
            Ok(json) => json,
            Err(e) => {
                return Some(StorageError::Write {
                    key: STORAGE_KEY.to_string(),
                    message: e.to_string(),
                })
            }
        };
        match self.backend.set(STORAGE_KEY, &json) {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("failed to save employee data: {e}");
                Some(e)
            }
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(StoreError::EmptyField { field })
    } else {
        Ok(trimmed.to_string())
    }
}

/// Copy of `patch` with its text fields trimmed and checked non-empty.
fn trimmed_patch(patch: &RecordPatch) -> Result<RecordPatch, StoreError> {
    let trim = |value: &Option<String>, field: &'static str| {
        value.as_deref().map(|v| required(v, field)).transpose()
    };
    Ok(RecordPatch {
        name: trim(&patch.name, "name")?,
        position: trim(&patch.position, "position")?,
        nip: trim(&patch.nip, "nip")?,
        ..patch.clone()
    })
}

/// Apply the Completed rollover when `record` enters Completed from a
/// different state.
fn settle(record: EmployeeRecord, previous: ReviewStatus, cycle: &CycleConfig) -> EmployeeRecord {
    if record.review_status == ReviewStatus::Completed && previous != ReviewStatus::Completed {
        tracing::info!(id = %record.id, "cycle completed, starting next cycle");
        complete_cycle(record, cycle)
    } else {
        record
    }
}
