//! Subcommand implementations and the state they share.

pub mod add;
pub mod delete;
pub mod edit;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod reviews;
pub mod suggest;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use comfy_table::Table;

use kgb_core::cycle::KgbSchedule;
use kgb_core::import::date_column::parse_date_text;
use kgb_core::model::{parse_review_date, EmployeeRecord, RecordPatch, ReviewStatus};
use kgb_core::storage::FileStore;
use kgb_core::store::{Outcome, RecordStore};
use kgb_providers::config::load_config_from;
use kgb_providers::KgbConfig;

/// Options every subcommand accepts.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

/// Loaded configuration plus the resolved data directory.
pub struct Context {
    pub config: KgbConfig,
    pub data_dir: PathBuf,
}

impl Context {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let config = load_config_from(global.config.as_deref())?;
        let data_dir = global
            .data_dir
            .clone()
            .unwrap_or_else(|| config.data_dir.clone());
        Ok(Self { config, data_dir })
    }

    /// Open the record store, creating the data directory if needed.
    pub fn open_store(&self) -> Result<RecordStore<FileStore>> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("failed to create data directory: {}", self.data_dir.display())
        })?;
        let opened = RecordStore::open(FileStore::new(&self.data_dir), self.config.cycle());
        Ok(take(opened))
    }
}

/// Print a persistence warning, if any, and unwrap the value.
pub fn take<T>(outcome: Outcome<T>) -> T {
    if let Some(warning) = &outcome.warning {
        eprintln!("Warning: {warning}");
    }
    outcome.into_value()
}

/// Accepts `YYYY-MM-DD` plus the formats the sheet importer understands.
pub fn parse_date_arg(value: &str) -> Result<NaiveDate> {
    parse_review_date(value)
        .or_else(|| parse_date_text(value))
        .with_context(|| format!("invalid date '{value}' (expected YYYY-MM-DD)"))
}

pub fn parse_status_arg(value: &str) -> Result<ReviewStatus> {
    value.parse::<ReviewStatus>().map_err(|e| {
        let known: Vec<&str> = ReviewStatus::ALL.iter().map(|s| s.label()).collect();
        anyhow::anyhow!("{e} (expected one of: {})", known.join(", "))
    })
}

/// Field values given on the command line for `edit` and `bulk-edit`.
#[derive(Debug, Clone, Default)]
pub struct FieldArgs {
    pub name: Option<String>,
    pub position: Option<String>,
    pub nip: Option<String>,
    pub last_kgb_date: Option<String>,
    pub status: Option<String>,
}

impl FieldArgs {
    pub fn into_patch(self) -> Result<RecordPatch> {
        Ok(RecordPatch {
            name: self.name,
            position: self.position,
            nip: self.nip,
            last_review_date: self.last_kgb_date.as_deref().map(parse_date_arg).transpose()?,
            review_status: self.status.as_deref().map(parse_status_arg).transpose()?,
        })
    }
}

/// Unit for the "Remaining" column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RemainingUnit {
    #[default]
    Days,
    Months,
    Years,
}

fn count_of(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// "12 days", "overdue by 3 days", "today"; or the same in whole months
/// or years.
pub fn describe_remaining(schedule: &KgbSchedule, unit: RemainingUnit) -> String {
    let days = schedule.days_remaining;
    if days == 0 {
        return "today".to_string();
    }
    let amount = match unit {
        RemainingUnit::Days => count_of(days.abs(), "day"),
        RemainingUnit::Months => {
            let months =
                i64::from(schedule.years_remaining) * 12 + i64::from(schedule.months_remaining);
            count_of(months.abs(), "month")
        }
        RemainingUnit::Years => count_of(i64::from(schedule.years_remaining).abs(), "year"),
    };
    if days > 0 {
        amount
    } else {
        format!("overdue by {amount}")
    }
}

pub fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_header(header.to_vec());
    table
}

/// Render records with their schedules.
pub fn schedule_table<'a>(
    rows: impl IntoIterator<Item = (&'a EmployeeRecord, KgbSchedule)>,
    unit: RemainingUnit,
) -> Table {
    let mut table = new_table(&[
        "ID",
        "Name",
        "NIP",
        "Position",
        "Last KGB",
        "Next KGB",
        "Remaining",
        "Status",
    ]);
    for (record, schedule) in rows {
        table.add_row(vec![
            record.id.clone(),
            record.name.clone(),
            record.nip.clone(),
            record.position.clone(),
            record.last_review_date.to_string(),
            schedule.next_review_date.to_string(),
            describe_remaining(&schedule, unit),
            record.review_status.to_string(),
        ]);
    }
    table
}

/// `ids` without repeats, first occurrence kept.
pub fn unique_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Whether `path` names a JSON file.
pub fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
