//! Operation Record
//!
//! One parsed row of an operation sheet. Columns are assigned by header
//! name through [`OperationRecord::set_column`], which validates the
//! enum-valued columns (`action`, `redirect`) and leaves everything else as
//! the raw trimmed string the sheet carried.
//!
//! A record accumulates at most one error for its whole lifetime: the first
//! failure (schema-level during parsing, or business-rule during the dry
//! run) wins, and later failures are ignored. Downstream reporting depends
//! on seeing the root cause, not whichever step happened to fail last.

use crate::models::{Redirect, TermAction, ValidationError};
use serde::{Deserialize, Serialize};

/// The sheet columns the parser recognizes, in canonical order.
///
/// Sheets are header-keyed: column order does not matter, unrecognized
/// columns are ignored, and recognized columns missing from the header
/// default to the empty string.
pub const RECOGNIZED_COLUMNS: [&str; 14] = [
    "vocabulary_name",
    "term_name",
    "tid",
    "path",
    "node_count",
    "term_child_count",
    "parent_term_name",
    "action",
    "target_term_name",
    "target_tid",
    "target_vocabulary_name",
    "target_field",
    "new_name",
    "redirect",
];

/// One row of requested work, plus the identifiers resolved while
/// processing it and the first error encountered (if any).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub vocabulary_name: String,
    pub term_name: String,
    /// Optional disambiguator when the (vocabulary, name) key is duplicated.
    pub tid: String,
    pub path: String,
    /// Informational columns carried through verbatim from the sheet.
    pub node_count: String,
    pub term_child_count: String,
    pub parent_term_name: String,
    pub action: TermAction,
    pub target_term_name: String,
    pub target_tid: String,
    pub target_vocabulary_name: String,
    /// Comma-separated field list; only meaningful for merge rows.
    pub target_field: String,
    /// Only meaningful for rename rows.
    pub new_name: String,
    pub redirect: Redirect,

    /// Resolved identifiers copied back from the tree after processing,
    /// regardless of rule outcome, so reporting and commit see concrete ids
    /// even for failed rows.
    #[serde(default)]
    pub vid: String,
    #[serde(default)]
    pub parent_tid: String,
    #[serde(default)]
    pub target_vid: String,

    /// First error encountered by this row, as a human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationRecord {
    /// Assign one sheet column by header name.
    ///
    /// Unrecognized columns are silently ignored (sheets routinely carry
    /// extra reporting columns). Values are expected pre-trimmed by the
    /// reader.
    pub fn set_column(&mut self, column: &str, value: &str) -> Result<(), ValidationError> {
        match column {
            "vocabulary_name" => self.vocabulary_name = value.to_string(),
            "term_name" => self.term_name = value.to_string(),
            "tid" => self.tid = value.to_string(),
            "path" => self.path = value.to_string(),
            "node_count" => self.node_count = value.to_string(),
            "term_child_count" => self.term_child_count = value.to_string(),
            "parent_term_name" => self.parent_term_name = value.to_string(),
            "action" => self.action = TermAction::from_sheet_value(value)?,
            "target_term_name" => self.target_term_name = value.to_string(),
            "target_tid" => self.target_tid = value.to_string(),
            "target_vocabulary_name" => self.target_vocabulary_name = value.to_string(),
            "target_field" => self.target_field = value.to_string(),
            "new_name" => self.new_name = value.to_string(),
            "redirect" => self.redirect = Redirect::from_sheet_value(value)?,
            _ => {}
        }
        Ok(())
    }

    /// Record a failure message. The first error wins; later calls on a row
    /// that already failed are ignored.
    pub fn record_error(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }

    /// Whether this row requests any work at all. Rows without an action are
    /// informational export rows and are not processed.
    pub fn has_action(&self) -> bool {
        self.action != TermAction::None
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "operation_test.rs"]
mod operation_test;
