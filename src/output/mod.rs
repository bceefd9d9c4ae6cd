//! Output: result files and run summaries

pub mod json;
pub mod table;

pub use json::{format_json, write_json_file, write_scan_result};
pub use table::format_table;
