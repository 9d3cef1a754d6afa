//! kgb-core: employee records, salary-step (KGB) cycle math, sheet import,
//! and the persisted record store.
//!
//! Everything the `kgb` tool does with employee data lives here; the
//! provider, report and CLI crates build on these types.

pub mod cycle;
pub mod error;
pub mod import;
pub mod model;
pub mod promotion;
pub mod query;
pub mod storage;
pub mod store;
pub mod traits;
