//! Dry-Run Error Taxonomy
//!
//! Every business-rule violation a dry run can surface, one variant per
//! kind. All of these are recoverable at the row level: the engine catches
//! them at the row boundary, latches the message onto the
//! `OperationRecord`, and keeps going so a single sheet pass reports every
//! problem at once.
//!
//! Messages are the exact text shown to editors in the error report, so
//! they name the term the way the sheet does (`Vocabulary > Name`).

use thiserror::Error;

/// Business-rule violations raised by the tree and the rule engine.
#[derive(Error, Debug)]
pub enum DryRunError {
    /// The (vocabulary, name) key already has an active record.
    #[error("{vocabulary} > {name} already exists")]
    DuplicateTerm { vocabulary: String, name: String },

    /// The named vocabulary does not resolve to a real vocabulary.
    #[error("{vocabulary} is not a valid vocabulary")]
    InvalidVocabulary { vocabulary: String },

    /// No record exists at the (vocabulary, name) key.
    #[error("{vocabulary} > {name} does not exist")]
    TermNotFound { vocabulary: String, name: String },

    /// More than one record shares the key and no tid was supplied.
    #[error("{vocabulary} > {name} is duplicated. Please provide a tid.")]
    AmbiguousTerm { vocabulary: String, name: String },

    /// A tid was supplied but no record at the key carries it.
    #[error("{tid} is not valid for {vocabulary} > {name}.")]
    InvalidId {
        tid: String,
        vocabulary: String,
        name: String,
    },

    /// The resolved record was flagged for delete earlier in this run.
    #[error("{vocabulary} > {name} has been flagged for delete")]
    TermDeleted { vocabulary: String, name: String },

    /// The resolved record was merged away earlier in this run.
    #[error("{vocabulary} > {name} has been merged into {target_vocabulary} > {target_name}")]
    TermMerged {
        vocabulary: String,
        name: String,
        target_vocabulary: String,
        target_name: String,
    },

    /// The resolved record was renamed earlier in this run.
    #[error("{vocabulary} > {name} has been renamed to {new_name}")]
    TermRenamed {
        vocabulary: String,
        name: String,
        new_name: String,
    },

    /// The term was consumed as a merge target earlier in this run.
    #[error("{vocabulary} > {name} is locked. This may be due to a chained action.")]
    TermLocked { vocabulary: String, name: String },

    /// Delete/merge sources must be childless; reparent or remove the
    /// children in an earlier row.
    #[error("{vocabulary} > {name} cannot be {verb} as it has children")]
    HasChildren {
        vocabulary: String,
        name: String,
        /// "deleted" or "merged", matching the failing rule.
        verb: &'static str,
    },

    /// A term cannot be its own parent.
    #[error("{name} cannot be parent of self")]
    SelfParent { name: String },

    /// The term being moved is an ancestor of the requested parent.
    #[error("{name} is a parent of {parent}")]
    CyclicParent { name: String, parent: String },

    /// At most one move per term per run.
    #[error("{name} has already been moved to {parent}")]
    AlreadyMoved { name: String, parent: String },

    /// Merge source and target are the same term.
    #[error("Cannot merge with self, please specify a tid.")]
    SelfMerge,

    /// Merge targets must already be persisted; a pending create has no tid
    /// for content items to point at.
    #[error("{vocabulary} > {name} has not been created yet")]
    TargetNotCreated { vocabulary: String, name: String },

    /// Cross-vocabulary merges must name the content field(s) to rewrite.
    #[error("You must specify a target_field when merge across vocabularies: {valid_fields}")]
    MissingTargetField { valid_fields: String },

    /// The named field does not allow terms of the target vocabulary.
    #[error("{field} cannot contain {vocabulary} terms, please use one of the following: {valid_fields}")]
    FieldVocabularyMismatch {
        field: String,
        vocabulary: String,
        valid_fields: String,
    },

    /// Rename with an empty (post-trim) new name.
    #[error("New name for {vocabulary} > {name} is empty")]
    EmptyName { vocabulary: String, name: String },

    /// Rename where the new name equals the current name.
    #[error("New name for {vocabulary} > {name} matches the current name")]
    NoOpRename { vocabulary: String, name: String },

    /// A collaborator (snapshot, vocabulary or field provider) failed.
    #[error("provider error: {0}")]
    Provider(#[from] anyhow::Error),
}

impl DryRunError {
    /// `TermNotFound`, with an "Unspecified" placeholder when the row did
    /// not name a vocabulary.
    pub fn term_not_found(name: impl Into<String>, vocabulary: &str) -> Self {
        let vocabulary = if vocabulary.is_empty() {
            "Unspecified".to_string()
        } else {
            vocabulary.to_string()
        };
        Self::TermNotFound {
            vocabulary,
            name: name.into(),
        }
    }

    pub fn duplicate_term(vocabulary: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateTerm {
            vocabulary: vocabulary.into(),
            name: name.into(),
        }
    }

    pub fn ambiguous_term(vocabulary: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AmbiguousTerm {
            vocabulary: vocabulary.into(),
            name: name.into(),
        }
    }

    pub fn invalid_id(
        tid: impl Into<String>,
        vocabulary: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::InvalidId {
            tid: tid.into(),
            vocabulary: vocabulary.into(),
            name: name.into(),
        }
    }

    pub fn term_locked(vocabulary: impl Into<String>, name: impl Into<String>) -> Self {
        Self::TermLocked {
            vocabulary: vocabulary.into(),
            name: name.into(),
        }
    }

    pub fn has_children(
        vocabulary: impl Into<String>,
        name: impl Into<String>,
        verb: &'static str,
    ) -> Self {
        Self::HasChildren {
            vocabulary: vocabulary.into(),
            name: name.into(),
            verb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_not_found_substitutes_unspecified_vocabulary() {
        let err = DryRunError::term_not_found("Sports", "");
        assert_eq!(err.to_string(), "Unspecified > Sports does not exist");

        let err = DryRunError::term_not_found("Sports", "Category");
        assert_eq!(err.to_string(), "Category > Sports does not exist");
    }

    #[test]
    fn test_has_children_message_uses_rule_verb() {
        let err = DryRunError::has_children("Category", "Sports", "deleted");
        assert_eq!(
            err.to_string(),
            "Category > Sports cannot be deleted as it has children"
        );
        let err = DryRunError::has_children("Category", "Sports", "merged");
        assert_eq!(
            err.to_string(),
            "Category > Sports cannot be merged as it has children"
        );
    }

    #[test]
    fn test_locked_message_mentions_chained_action() {
        let err = DryRunError::term_locked("Category", "Sports");
        assert_eq!(
            err.to_string(),
            "Category > Sports is locked. This may be due to a chained action."
        );
    }
}
