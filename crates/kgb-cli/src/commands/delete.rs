//! The `kgb delete` and `kgb bulk-delete` commands.

use anyhow::Result;

use super::{take, unique_ids, Context, GlobalArgs};

pub fn execute(global: &GlobalArgs, id: String) -> Result<()> {
    let ctx = Context::load(global)?;
    let mut store = ctx.open_store()?;
    let removed = take(store.delete(&id)?);
    println!("Deleted {} ({})", removed.name, removed.id);
    Ok(())
}

pub fn execute_bulk(global: &GlobalArgs, ids: Vec<String>) -> Result<()> {
    let ids = unique_ids(ids);
    anyhow::ensure!(!ids.is_empty(), "no ids given");
    let ctx = Context::load(global)?;
    let mut store = ctx.open_store()?;
    let removed = take(store.bulk_delete(&ids));
    println!("Deleted {removed} employees");
    Ok(())
}
