//! kgb-report: export writers for the employee collection.
//!
//! Two formats: the JSON array that `kgb import` reads back, and a
//! year-matrix sheet showing the review month for each year in a range.

pub mod error;
pub mod json;
pub mod sheet;

pub use error::ExportError;
pub use json::{default_json_file_name, write_json_export};
pub use sheet::{default_sheet_file_name, generate_sheet, write_sheet_export, YearRange};
