//! The `kgb list` command.

use anyhow::Result;

use kgb_core::cycle::today;
use kgb_core::query::{search, sort_by_next_review, SortOrder};

use super::{parse_status_arg, schedule_table, Context, GlobalArgs, RemainingUnit};

pub fn execute(
    global: &GlobalArgs,
    term: Option<String>,
    sort: SortOrder,
    status: Option<String>,
    json: bool,
    unit: RemainingUnit,
) -> Result<()> {
    let ctx = Context::load(global)?;
    let store = ctx.open_store()?;
    let status = status.as_deref().map(parse_status_arg).transpose()?;

    let matches = search(store.records(), term.as_deref().unwrap_or_default());
    let filtered = matches
        .into_iter()
        .filter(|r| status.is_none_or(|s| r.review_status == s));
    let sorted = sort_by_next_review(filtered, sort, today(), store.cycle());

    if json {
        let records: Vec<_> = sorted.iter().map(|s| s.record).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if sorted.is_empty() {
        if store.is_empty() {
            println!("No employees yet. Add one with `kgb add` or run `kgb import`.");
        } else {
            println!("No employees match.");
        }
        return Ok(());
    }

    let count = sorted.len();
    let table = schedule_table(sorted.into_iter().map(|s| (s.record, s.schedule)), unit);
    println!("{table}");
    println!("{count} of {} employees", store.len());
    Ok(())
}
