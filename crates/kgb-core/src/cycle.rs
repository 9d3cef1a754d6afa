//! KGB cycle math: next review date, time remaining, and cycle rollover.
//!
//! Every function takes "today" as an argument so results are reproducible;
//! callers that want the wall clock use [`today`].

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{parse_review_date, EmployeeRecord, ReviewStatus};

/// Years between two salary-step increases unless configured otherwise.
pub const DEFAULT_CYCLE_LENGTH_YEARS: u32 = 2;

/// How far ahead the review list looks, in days.
pub const DEFAULT_REVIEW_WINDOW_DAYS: i64 = 90;

/// Cycle settings shared by the calculator, the store and the exporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Number of years between successive reviews. Must be at least 1.
    pub cycle_length_years: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_length_years: DEFAULT_CYCLE_LENGTH_YEARS,
        }
    }
}

impl CycleConfig {
    pub fn new(cycle_length_years: u32) -> Self {
        Self { cycle_length_years }
    }
}

/// Next review date and the time left until it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KgbSchedule {
    pub next_review_date: NaiveDate,
    /// Calendar days from today to the next review; negative when overdue.
    pub days_remaining: i64,
    /// Whole months left after `years_remaining` (-11..=11).
    pub months_remaining: i32,
    /// Whole years left.
    pub years_remaining: i32,
}

/// Coarse classification used for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutlook {
    /// The stored date could not be read.
    Unknown,
    /// The next review date has passed.
    Overdue,
    /// The next review falls inside the review window.
    Due,
    /// The next review is further out than the window.
    Upcoming,
}

impl ReviewOutlook {
    pub fn of(schedule: Option<&KgbSchedule>, window_days: i64) -> Self {
        match schedule {
            None => ReviewOutlook::Unknown,
            Some(s) if s.days_remaining < 0 => ReviewOutlook::Overdue,
            Some(s) if s.days_remaining <= window_days => ReviewOutlook::Due,
            Some(_) => ReviewOutlook::Upcoming,
        }
    }

    /// Unknown dates are shown the same way as overdue ones.
    pub fn displays_as_overdue(&self) -> bool {
        matches!(self, ReviewOutlook::Overdue | ReviewOutlook::Unknown)
    }
}

impl KgbSchedule {
    pub fn is_overdue(&self) -> bool {
        self.days_remaining < 0
    }

    pub fn outlook(&self, window_days: i64) -> ReviewOutlook {
        ReviewOutlook::of(Some(self), window_days)
    }
}

/// The local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Shift a date by whole calendar years. Feb 29 lands on Feb 28 in
/// non-leap years. Returns `None` only outside chrono's date range.
pub fn shift_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let months = Months::new(years.unsigned_abs().checked_mul(12)?);
    if years >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

/// `last_review_date` plus one cycle.
pub fn next_review_date(last_review_date: NaiveDate, config: &CycleConfig) -> NaiveDate {
    let years = i32::try_from(config.cycle_length_years).unwrap_or(i32::MAX);
    shift_years(last_review_date, years).unwrap_or(NaiveDate::MAX)
}

/// Compute the schedule for a review cycle that last completed on
/// `last_review_date`.
pub fn schedule(last_review_date: NaiveDate, today: NaiveDate, config: &CycleConfig) -> KgbSchedule {
    let next = next_review_date(last_review_date, config);
    let days_remaining = (next - today).num_days();
    let total_months = whole_months_between(today, next);

    KgbSchedule {
        next_review_date: next,
        days_remaining,
        months_remaining: total_months % 12,
        years_remaining: total_months / 12,
    }
}

/// [`schedule`] against the local clock.
pub fn schedule_today(last_review_date: NaiveDate, config: &CycleConfig) -> KgbSchedule {
    schedule(last_review_date, today(), config)
}

/// Schedule from an unparsed date string. `None` means the date is unknown;
/// callers display it as overdue.
pub fn schedule_raw(raw: &str, today: NaiveDate, config: &CycleConfig) -> Option<KgbSchedule> {
    parse_review_date(raw).map(|date| schedule(date, today, config))
}

/// Signed count of whole months from `from` to `to`.
fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    if to < from {
        return -whole_months_between(to, from);
    }
    let mut months = (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0)
}

/// Close the current cycle: the next review date becomes the last one and
/// the status starts over at NotSubmitted.
pub fn complete_cycle(mut record: EmployeeRecord, config: &CycleConfig) -> EmployeeRecord {
    record.last_review_date = next_review_date(record.last_review_date, config);
    record.review_status = ReviewStatus::NotSubmitted;
    record
}

/// All review dates on this employee's cycle (earlier and later) that fall
/// in `start_year..=end_year`, ascending.
pub fn review_dates_in_range(
    last_review_date: NaiveDate,
    config: &CycleConfig,
    start_year: i32,
    end_year: i32,
) -> Vec<NaiveDate> {
    if end_year < start_year {
        return Vec::new();
    }
    let step = i32::try_from(config.cycle_length_years.max(1)).unwrap_or(i32::MAX);
    let base = last_review_date.year();
    let first_k = (start_year - base).div_euclid(step);
    let last_k = (end_year - base).div_euclid(step);

    (first_k..=last_k)
        .filter_map(|k| shift_years(last_review_date, k.checked_mul(step)?))
        .filter(|d| (start_year..=end_year).contains(&d.year()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(last: NaiveDate, status: ReviewStatus) -> EmployeeRecord {
        EmployeeRecord {
            id: "r1".into(),
            name: "Andi".into(),
            position: "Staff".into(),
            nip: "123".into(),
            last_review_date: last,
            review_status: status,
        }
    }

    #[test]
    fn next_date_adds_configured_years() {
        assert_eq!(
            next_review_date(date(2023, 3, 1), &CycleConfig::new(2)),
            date(2025, 3, 1)
        );
        assert_eq!(
            next_review_date(date(2023, 3, 1), &CycleConfig::new(1)),
            date(2024, 3, 1)
        );
    }

    #[test]
    fn leap_day_clamps_to_end_of_february() {
        assert_eq!(
            next_review_date(date(2024, 2, 29), &CycleConfig::new(1)),
            date(2025, 2, 28)
        );
        assert_eq!(
            next_review_date(date(2024, 2, 29), &CycleConfig::new(4)),
            date(2028, 2, 29)
        );
    }

    #[test]
    fn days_remaining_sign_tracks_overdue() {
        let cfg = CycleConfig::new(2);
        let today = date(2025, 1, 10);

        let overdue = schedule(date(2023, 1, 9), today, &cfg);
        assert_eq!(overdue.days_remaining, -1);
        assert!(overdue.is_overdue());

        let due_today = schedule(date(2023, 1, 10), today, &cfg);
        assert_eq!(due_today.days_remaining, 0);
        assert!(!due_today.is_overdue());

        let later = schedule(date(2023, 1, 11), today, &cfg);
        assert_eq!(later.days_remaining, 1);
    }

    #[test]
    fn breakdown_in_years_and_months() {
        let cfg = CycleConfig::new(2);
        let s = schedule(date(2024, 6, 15), date(2024, 1, 20), &cfg);
        // next = 2026-06-15: 2 years, 4 whole months (Jun 15 < Jun 20)
        assert_eq!(s.next_review_date, date(2026, 6, 15));
        assert_eq!(s.years_remaining, 2);
        assert_eq!(s.months_remaining, 4);

        let late = schedule(date(2021, 1, 1), date(2024, 3, 1), &cfg);
        assert_eq!(late.years_remaining, -1);
        assert_eq!(late.months_remaining, -2);
    }

    #[test]
    fn unparseable_raw_date_is_unknown() {
        let cfg = CycleConfig::default();
        assert!(schedule_raw("not a date", date(2025, 1, 1), &cfg).is_none());
        let outlook = ReviewOutlook::of(None, DEFAULT_REVIEW_WINDOW_DAYS);
        assert_eq!(outlook, ReviewOutlook::Unknown);
        assert!(outlook.displays_as_overdue());

        let s = schedule_raw("2024-01-01", date(2025, 1, 1), &cfg).unwrap();
        assert_eq!(s.next_review_date, date(2026, 1, 1));
    }

    #[test]
    fn outlook_respects_window() {
        let cfg = CycleConfig::new(1);
        let today = date(2025, 1, 1);
        assert_eq!(
            schedule(date(2024, 3, 1), today, &cfg).outlook(90),
            ReviewOutlook::Due
        );
        assert_eq!(
            schedule(date(2024, 9, 1), today, &cfg).outlook(90),
            ReviewOutlook::Upcoming
        );
    }

    #[test]
    fn complete_cycle_advances_one_cycle_and_resets_status() {
        let cfg = CycleConfig::new(2);
        let done = complete_cycle(record(date(2023, 4, 1), ReviewStatus::Completed), &cfg);
        assert_eq!(done.last_review_date, date(2025, 4, 1));
        assert_eq!(done.review_status, ReviewStatus::NotSubmitted);
        assert_eq!(done.id, "r1");
    }

    #[test]
    fn review_dates_cover_past_and_future_cycles() {
        let cfg = CycleConfig::new(2);
        let dates = review_dates_in_range(date(2023, 3, 1), &cfg, 2018, 2026);
        assert_eq!(
            dates,
            vec![
                date(2019, 3, 1),
                date(2021, 3, 1),
                date(2023, 3, 1),
                date(2025, 3, 1)
            ]
        );
        assert!(review_dates_in_range(date(2023, 3, 1), &cfg, 2024, 2024).is_empty());
        assert!(review_dates_in_range(date(2023, 3, 1), &cfg, 2026, 2020).is_empty());
    }
}
