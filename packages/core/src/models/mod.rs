//! Data Models
//!
//! This module contains the core data structures used throughout the term
//! manager:
//!
//! - `TermRecord` - One taxonomy term, real or pending, as tracked by the tree
//! - `OperationRecord` - One parsed row of an operation sheet
//! - `TermAction` / `Redirect` - The shared enums every component dispatches on
//!
//! The action enum is deliberately defined once and re-used everywhere; the
//! sheet format, the tree tombstones and the rule engine must never drift
//! apart on the action vocabulary.

mod action;
mod operation;
mod term;

pub use action::{Redirect, TermAction, ValidationError};
pub use operation::{OperationRecord, RECOGNIZED_COLUMNS};
pub use term::{MergeTarget, TermRecord};
