//! Shared Action and Redirect Enums
//!
//! Every component of the term manager (sheet parsing, tree tombstones, the
//! rule engine) dispatches on the same `TermAction` enum defined here. The
//! sheet serializes `MoveParent` as the literal `"move parent"` (note the
//! space); `from_sheet_value` accepts exactly the values an operation sheet
//! may carry.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Schema-level validation errors raised while assigning sheet columns.
///
/// These are distinct from the business-rule errors in
/// [`crate::services::DryRunError`]: they mean the row itself is malformed,
/// not that the requested operation conflicts with the taxonomy.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0} is not a valid action")]
    InvalidAction(String),

    #[error("{0} is not a valid redirect value")]
    InvalidRedirect(String),
}

/// The action requested by an operation row, or pending on a tree record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermAction {
    /// No action: informational/export rows, or an untouched tree record.
    #[default]
    None,
    Create,
    Delete,
    Merge,
    Rename,
    MoveParent,
}

impl TermAction {
    /// Parse the `action` column of an operation sheet.
    ///
    /// The empty string is a valid "no action" value; anything not in the
    /// recognized set is a schema error.
    pub fn from_sheet_value(value: &str) -> Result<Self, ValidationError> {
        match value {
            "" => Ok(Self::None),
            "create" => Ok(Self::Create),
            "delete" => Ok(Self::Delete),
            "merge" => Ok(Self::Merge),
            "rename" => Ok(Self::Rename),
            "move parent" => Ok(Self::MoveParent),
            other => Err(ValidationError::InvalidAction(other.to_string())),
        }
    }

    /// The value this action takes in the sheet's `action` column.
    pub fn sheet_value(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Merge => "merge",
            Self::Rename => "rename",
            Self::MoveParent => "move parent",
        }
    }

    /// Whether a tree record flagged with this action has been retired under
    /// its current identity and must not be resolved by active lookups.
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Self::Delete | Self::Merge | Self::Rename)
    }
}

impl fmt::Display for TermAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_value())
    }
}

/// Redirect handling requested for a retired term's alias.
///
/// The sheet treats an empty value and `"y"` as a 301 redirect; only an
/// explicit `"n"` opts out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Redirect {
    #[default]
    Moved301,
    No,
}

impl Redirect {
    /// Normalize the `redirect` column of an operation sheet.
    pub fn from_sheet_value(value: &str) -> Result<Self, ValidationError> {
        match value {
            "" | "y" | "301" => Ok(Self::Moved301),
            "n" => Ok(Self::No),
            other => Err(ValidationError::InvalidRedirect(other.to_string())),
        }
    }

    pub fn sheet_value(&self) -> &'static str {
        match self {
            Self::Moved301 => "301",
            Self::No => "n",
        }
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_value())
    }
}
