//! Output formatters for the duplicate report.
//!
//! Every formatter renders the same record list: one entry per confirmed
//! duplicate, naming the duplicate path and the original it copies, plus a
//! cumulative count.
//!
//! - text for the console and plain files
//! - JSON for automation and scripting
//! - CSV for spreadsheet import

pub mod csv;
pub mod json;
pub mod text;

pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;
