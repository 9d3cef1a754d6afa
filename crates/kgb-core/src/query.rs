//! Read-only views over the employee list: search, ordering, and the
//! "due for review" list.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::cycle::{schedule, CycleConfig, KgbSchedule};
use crate::model::EmployeeRecord;

/// Order for the next-review sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Soonest (or most overdue) first.
    #[default]
    Closest,
    Furthest,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Closest => write!(f, "closest"),
            SortOrder::Furthest => write!(f, "furthest"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "closest" | "asc" => Ok(SortOrder::Closest),
            "furthest" | "desc" => Ok(SortOrder::Furthest),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// A record together with its computed schedule.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledRecord<'a> {
    pub record: &'a EmployeeRecord,
    pub schedule: KgbSchedule,
}

/// Records matching `term`: case-insensitive on name and position, plain
/// substring on NIP. An empty term matches everything.
pub fn search<'a>(records: &'a [EmployeeRecord], term: &str) -> Vec<&'a EmployeeRecord> {
    let term = term.trim();
    if term.is_empty() {
        return records.iter().collect();
    }
    let lowered = term.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&lowered)
                || r.position.to_lowercase().contains(&lowered)
                || r.nip.contains(term)
        })
        .collect()
}

/// Attach schedules and sort by days remaining. The sort is stable, so
/// ties keep collection order.
pub fn sort_by_next_review<'a>(
    records: impl IntoIterator<Item = &'a EmployeeRecord>,
    order: SortOrder,
    today: NaiveDate,
    cycle: &CycleConfig,
) -> Vec<ScheduledRecord<'a>> {
    let mut scheduled: Vec<ScheduledRecord<'a>> = records
        .into_iter()
        .map(|record| ScheduledRecord {
            record,
            schedule: schedule(record.last_review_date, today, cycle),
        })
        .collect();

    match order {
        SortOrder::Closest => scheduled.sort_by_key(|s| s.schedule.days_remaining),
        SortOrder::Furthest => {
            scheduled.sort_by_key(|s| std::cmp::Reverse(s.schedule.days_remaining))
        }
    }
    scheduled
}

/// Records whose next review is between today and `window_days` ahead,
/// closest first.
pub fn due_for_review<'a>(
    records: &'a [EmployeeRecord],
    today: NaiveDate,
    cycle: &CycleConfig,
    window_days: i64,
) -> Vec<ScheduledRecord<'a>> {
    sort_by_next_review(records, SortOrder::Closest, today, cycle)
        .into_iter()
        .filter(|s| (0..=window_days).contains(&s.schedule.days_remaining))
        .collect()
}

/// Records whose next review date has passed, most overdue first.
pub fn overdue<'a>(
    records: &'a [EmployeeRecord],
    today: NaiveDate,
    cycle: &CycleConfig,
) -> Vec<ScheduledRecord<'a>> {
    sort_by_next_review(records, SortOrder::Closest, today, cycle)
        .into_iter()
        .filter(|s| s.schedule.is_overdue())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(id: &str, name: &str, position: &str, nip: &str, last: NaiveDate) -> EmployeeRecord {
        EmployeeRecord {
            id: id.into(),
            name: name.into(),
            position: position.into(),
            nip: nip.into(),
            last_review_date: last,
            review_status: ReviewStatus::NotSubmitted,
        }
    }

    fn roster() -> Vec<EmployeeRecord> {
        vec![
            rec("1", "Siti Rahma", "Analis", "19800101", date(2023, 6, 1)),
            rec("2", "Bambang", "Pengawas Sekolah", "19850202", date(2023, 2, 1)),
            rec("3", "Dewi", "Staf Keuangan", "19900303", date(2022, 12, 1)),
            rec("4", "Eko", "Analis Data", "19910404", date(2024, 1, 1)),
        ]
    }

    #[test]
    fn search_matches_name_position_and_nip() {
        let records = roster();
        let ids = |v: Vec<&EmployeeRecord>| v.iter().map(|r| r.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(search(&records, "ANALIS")), vec!["1", "4"]);
        assert_eq!(ids(search(&records, "bamb")), vec!["2"]);
        assert_eq!(ids(search(&records, "19900303")), vec!["3"]);
        assert_eq!(search(&records, "  ").len(), 4);
        assert!(search(&records, "nobody").is_empty());
    }

    #[test]
    fn sort_closest_and_furthest() {
        let records = roster();
        let cfg = CycleConfig::new(2);
        let today = date(2025, 1, 15);

        let closest: Vec<&str> = sort_by_next_review(&records, SortOrder::Closest, today, &cfg)
            .iter()
            .map(|s| s.record.id.as_str())
            .collect();
        assert_eq!(closest, vec!["3", "2", "1", "4"]);

        let furthest: Vec<&str> = sort_by_next_review(&records, SortOrder::Furthest, today, &cfg)
            .iter()
            .map(|s| s.record.id.as_str())
            .collect();
        assert_eq!(furthest, vec!["4", "1", "2", "3"]);
    }

    #[test]
    fn due_window_excludes_overdue_and_far_future() {
        let records = roster();
        let cfg = CycleConfig::new(2);
        let today = date(2025, 1, 15);

        let due: Vec<&str> = due_for_review(&records, today, &cfg, 90)
            .iter()
            .map(|s| s.record.id.as_str())
            .collect();
        // 2 -> 2025-02-01 (17 days); 3 -> 2024-12-01 overdue; 1 -> 2025-06-01 (137 days)
        assert_eq!(due, vec!["2"]);

        let late: Vec<&str> = overdue(&records, today, &cfg)
            .iter()
            .map(|s| s.record.id.as_str())
            .collect();
        assert_eq!(late, vec!["3"]);
    }

    #[test]
    fn sort_order_parse() {
        assert_eq!("Furthest".parse::<SortOrder>().unwrap(), SortOrder::Furthest);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Closest);
        assert!("random".parse::<SortOrder>().is_err());
    }
}
