//! The `kgb add` command.

use anyhow::Result;

use kgb_core::cycle::next_review_date;
use kgb_core::model::{NewEmployee, ReviewStatus};

use super::{parse_date_arg, parse_status_arg, take, Context, GlobalArgs};

pub fn execute(
    global: &GlobalArgs,
    name: String,
    position: String,
    nip: String,
    last_kgb_date: String,
    status: Option<String>,
) -> Result<()> {
    let ctx = Context::load(global)?;
    let mut store = ctx.open_store()?;

    let new = NewEmployee {
        name,
        position,
        nip,
        last_review_date: parse_date_arg(&last_kgb_date)?,
        review_status: status
            .as_deref()
            .map(parse_status_arg)
            .transpose()?
            .unwrap_or(ReviewStatus::NotSubmitted),
    };

    let record = take(store.add(new)?);
    println!("Added {} ({})", record.name, record.id);
    println!(
        "Next KGB: {}",
        next_review_date(record.last_review_date, store.cycle())
    );
    Ok(())
}
