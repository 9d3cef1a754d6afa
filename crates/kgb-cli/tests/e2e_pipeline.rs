//! End-to-end pipeline: sheet import -> store -> queries -> exports -> re-import.
//!
//! Runs against the library crates with an in-memory backend, so the dates
//! are fixed and nothing depends on the wall clock.

use chrono::NaiveDate;

use kgb_core::cycle::CycleConfig;
use kgb_core::import::{import_table, read_csv_str, ImportStrategy};
use kgb_core::model::{RecordPatch, ReviewStatus};
use kgb_core::query::{due_for_review, overdue, search, sort_by_next_review, SortOrder};
use kgb_core::storage::{KeyValueStore, MemoryStore, STORAGE_KEY};
use kgb_core::store::RecordStore;
use kgb_report::{generate_sheet, write_json_export, YearRange};

const ROSTER: &str = "\
No,NIP,NAMA,2020,2021,2022,2023,2024,JABATAN
1,'198001012005012001,Jane Doe,0,0,0,Mar,0,Analis Kepegawaian
2,'199002022015031002,Budi Santoso,0,0,Nov,0,0,Staf Keuangan
3,'197505052000031003,Rina Wati,0,0,0,0,Feb,Pengawas
4,'198808082010012004,Tanpa Bulan,0,0,0,0,0,Staf
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn imported_store() -> RecordStore<MemoryStore> {
    let table = read_csv_str(ROSTER).unwrap();
    let outcome = import_table(&table, ImportStrategy::Auto).unwrap();
    assert_eq!(outcome.strategy, ImportStrategy::YearMatrix);
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].row, 5);

    let opened = RecordStore::open(MemoryStore::new(), CycleConfig::new(2));
    assert!(opened.is_clean());
    let mut store = opened.into_value();
    let count = store.replace_all(outcome.records).unwrap();
    assert!(count.is_clean());
    assert_eq!(count.value, 3);
    store
}

#[test]
fn imported_roster_drives_review_queries() {
    let store = imported_store();
    let today = date(2025, 1, 20);
    let cycle = *store.cycle();

    // Jane -> 2025-03-01 (40 days), Budi -> 2024-11-01 (overdue), Rina -> 2026-02-01.
    let due: Vec<&str> = due_for_review(store.records(), today, &cycle, 90)
        .iter()
        .map(|s| s.record.name.as_str())
        .collect();
    assert_eq!(due, vec!["Jane Doe"]);

    let late: Vec<&str> = overdue(store.records(), today, &cycle)
        .iter()
        .map(|s| s.record.name.as_str())
        .collect();
    assert_eq!(late, vec!["Budi Santoso"]);

    let furthest = sort_by_next_review(store.records(), SortOrder::Furthest, today, &cycle);
    assert_eq!(furthest[0].record.name, "Rina Wati");
    assert_eq!(furthest[0].schedule.next_review_date, date(2026, 2, 1));

    let hits = search(store.records(), "keuangan");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].nip, "199002022015031002");
}

#[test]
fn completing_cycles_persists_and_reloads() {
    let mut store = imported_store();
    let ids: Vec<String> = store
        .records()
        .iter()
        .filter(|r| r.name != "Rina Wati")
        .map(|r| r.id.clone())
        .collect();

    let patch = RecordPatch {
        review_status: Some(ReviewStatus::Completed),
        ..Default::default()
    };
    let changed = store.bulk_update(&ids, &patch).unwrap();
    assert!(changed.is_clean());
    assert_eq!(changed.value, 2);

    let jane = store
        .records()
        .iter()
        .find(|r| r.name == "Jane Doe")
        .unwrap();
    assert_eq!(jane.last_review_date, date(2025, 3, 1));
    assert_eq!(jane.review_status, ReviewStatus::NotSubmitted);

    // Reopen from what was persisted.
    let raw = store.backend().get(STORAGE_KEY).unwrap().unwrap();
    let reopened = RecordStore::open(
        MemoryStore::with_entry(STORAGE_KEY, &raw),
        CycleConfig::new(2),
    )
    .into_value();
    assert_eq!(reopened.records(), store.records());
}

#[test]
fn exports_feed_back_into_imports() {
    let store = imported_store();

    // JSON export -> strict import into a new store.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kgb-data-export.json");
    write_json_export(store.records(), &path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();

    let mut restored = RecordStore::open(MemoryStore::new(), CycleConfig::new(2)).into_value();
    let imported = restored.import_json(&content).unwrap();
    assert_eq!(imported.value, 3);
    assert_eq!(restored.records(), store.records());

    // Sheet export -> year-matrix import. Each row comes back with the
    // latest review on its cycle inside the exported range.
    let range = YearRange::new(2020, 2024, 2025).unwrap();
    let sheet = generate_sheet(store.records(), store.cycle(), &range).unwrap();
    let reimported = import_table(&read_csv_str(&sheet).unwrap(), ImportStrategy::Auto).unwrap();
    let dates: Vec<NaiveDate> = reimported
        .records
        .iter()
        .map(|r| r.last_review_date)
        .collect();
    assert_eq!(
        dates,
        vec![date(2023, 3, 1), date(2024, 11, 1), date(2024, 2, 1)]
    );
    for (before, after) in store.records().iter().zip(&reimported.records) {
        assert_eq!(before.nip, after.nip);
        assert_ne!(before.id, after.id);
    }
}

#[test]
fn failed_writes_surface_as_warnings() {
    let mut store = imported_store();
    let id = store.records()[0].id.clone();

    // Swap in a backend that rejects writes by reopening over one.
    let raw = store.backend().get(STORAGE_KEY).unwrap().unwrap();
    let mut failing = RecordStore::open(
        MemoryStore::with_entry(STORAGE_KEY, &raw).failing_writes(),
        CycleConfig::new(2),
    )
    .into_value();

    let outcome = failing.delete(&id).unwrap();
    assert!(outcome.warning.is_some());
    assert_eq!(failing.len(), 2);

    // The healthy store is untouched.
    assert!(store.delete(&id).unwrap().is_clean());
}
