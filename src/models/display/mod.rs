//! Display model implementations for table output
//!
//! Display models turn scan outcomes into rows with CLI column names.

mod target;

pub use target::TargetDisplay;
