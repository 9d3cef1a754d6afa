//! The `kgb reviews` command: who is due soon, and who is late.

use anyhow::Result;

use kgb_core::cycle::today;
use kgb_core::query::{due_for_review, overdue};

use super::{schedule_table, Context, GlobalArgs, RemainingUnit};

pub fn execute(
    global: &GlobalArgs,
    window: Option<u32>,
    include_overdue: bool,
    unit: RemainingUnit,
) -> Result<()> {
    let ctx = Context::load(global)?;
    let store = ctx.open_store()?;
    let window = window.map(i64::from).unwrap_or_else(|| ctx.config.review_window());
    let today = today();

    let due = due_for_review(store.records(), today, store.cycle(), window);
    if due.is_empty() {
        println!("No employees are due for review in the next {window} days.");
    } else {
        println!("Due for review in the next {window} days:");
        println!(
            "{}",
            schedule_table(due.iter().map(|s| (s.record, s.schedule)), unit)
        );
    }

    if include_overdue {
        let late = overdue(store.records(), today, store.cycle());
        if late.is_empty() {
            println!("\nNo overdue reviews.");
        } else {
            println!("\nOverdue:");
            println!(
                "{}",
                schedule_table(late.iter().map(|s| (s.record, s.schedule)), unit)
            );
        }
    }

    Ok(())
}
