//! Bulk device import from a spreadsheet

pub mod orchestrator;
pub mod reader;
pub mod row;

pub use orchestrator::{ImportSummary, RowOutcome, import_all};
pub use reader::read_rows;
pub use row::RESOLVED_KINDS;
