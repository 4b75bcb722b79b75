//! Compliance checklist collector.
//!
//! Runs a fixed catalog of compliance checks as SQL queries against a
//! managed analytics engine, flattens each result row into a named-field
//! record and emits newline-delimited JSON for the compliance dashboard.

pub mod engine;
pub mod errors;
pub mod model;
pub mod queries;
pub mod report;
pub mod run;

pub use errors::ExecuteError;
pub use model::CheckRecord;
pub use run::{run_checklist, RunOptions, RunSummary};
