//! Dry-Run Services
//!
//! - `DryRunEngine` - the rule engine that replays an operation sheet
//!   against the in-memory tree
//! - `DryRunError` - the business-rule error taxonomy
//!
//! The engine is a pure-ish function from (snapshot, operation rows) to
//! (mutated tree, operation batch); it holds no global state and one
//! instance must never be shared between runs.

pub mod dry_run;
pub mod error;

pub use dry_run::{DryRunEngine, DryRunSummary};
pub use error::DryRunError;
