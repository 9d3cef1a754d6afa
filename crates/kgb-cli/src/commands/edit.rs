//! The `kgb edit` and `kgb bulk-edit` commands.

use anyhow::Result;

use kgb_core::model::ReviewStatus;

use super::{take, unique_ids, Context, FieldArgs, GlobalArgs};

pub fn execute(global: &GlobalArgs, id: String, fields: FieldArgs) -> Result<()> {
    let patch = fields.into_patch()?;
    anyhow::ensure!(!patch.is_empty(), "nothing to change; pass at least one field");

    let ctx = Context::load(global)?;
    let mut store = ctx.open_store()?;
    let mut record = store
        .get(&id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("employee not found: {id}"))?;
    let previous = record.review_status;
    patch.apply_to(&mut record);

    let updated = take(store.update(record)?);
    println!("Updated {} ({})", updated.name, updated.id);
    if patch.review_status == Some(ReviewStatus::Completed) && previous != ReviewStatus::Completed
    {
        println!(
            "Cycle completed; last KGB is now {} and status is {}",
            updated.last_review_date, updated.review_status
        );
    }
    Ok(())
}

pub fn execute_bulk(global: &GlobalArgs, ids: Vec<String>, fields: FieldArgs) -> Result<()> {
    let ids = unique_ids(ids);
    anyhow::ensure!(!ids.is_empty(), "no ids given");
    let patch = fields.into_patch()?;
    anyhow::ensure!(!patch.is_empty(), "nothing to change; pass at least one field");

    let ctx = Context::load(global)?;
    let mut store = ctx.open_store()?;
    let changed = take(store.bulk_update(&ids, &patch)?);

    let unknown = ids.len().saturating_sub(changed);
    println!("Updated {changed} employees");
    if unknown > 0 {
        eprintln!("Warning: {unknown} id(s) did not match any employee");
    }
    Ok(())
}
