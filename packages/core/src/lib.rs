//! Term Manager Core Logic Layer
//!
//! This crate provides the dry-run validation engine for bulk taxonomy
//! editing: operation sheets (CSV/TSV) describing term creates, deletes,
//! merges, renames and parent moves are replayed against an in-memory
//! snapshot of the taxonomy so every conflict is surfaced before the
//! destructive commit phase touches real data.
//!
//! # Architecture
//!
//! - **Point-in-time tree**: the taxonomy snapshot is loaded once per run
//!   into [`tree::TaxonomyTree`]; every rule mutates that tree so later rows
//!   observe the effects of earlier rows in the same sheet.
//! - **Tombstones**: terms flagged for delete/merge/rename stay in the tree
//!   under their old key so later rows referencing the old identity fail
//!   with a precise error instead of silently succeeding.
//! - **Best-effort batch**: a row failure never aborts the run; errors are
//!   accumulated on the [`operations::OperationBatch`] and the caller
//!   decides whether any error blocks the commit.
//!
//! # Modules
//!
//! - [`models`] - Data structures (TermRecord, OperationRecord, actions)
//! - [`tree`] - In-memory taxonomy forest with two-tier lookup
//! - [`providers`] - Collaborator contracts (snapshot, vocabularies, fields)
//! - [`operations`] - Operation sheets: row parsing and batch accumulation
//! - [`services`] - The dry-run rule engine and its error taxonomy

pub mod models;
pub mod operations;
pub mod providers;
pub mod services;
pub mod tree;

// Re-export commonly used types
pub use models::{MergeTarget, OperationRecord, Redirect, TermAction, TermRecord, ValidationError};
pub use operations::{BatchError, OperationBatch, ReaderOptions};
pub use providers::{FieldConstraintProvider, SnapshotTerm, TermSnapshotSource, VocabularyResolver};
pub use services::{DryRunEngine, DryRunError, DryRunSummary};
pub use tree::TaxonomyTree;
