//! Term Record
//!
//! One taxonomy term as tracked by the in-memory tree for the duration of a
//! dry run: the snapshot fields plus the run-scoped state (pending action,
//! lock flag, live child set).
//!
//! Records are never removed from the tree. A term flagged for
//! delete/merge/rename stays under its old key as a tombstone so later rows
//! that reference the old identity fail with a precise error.

use crate::models::TermAction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where a merged term's content went.
///
/// Recorded on the merge *source* when the merge rule succeeds, so the
/// commit phase (and tombstone error messages) know the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeTarget {
    pub tid: String,
    pub vid: String,
    pub name: String,
    pub vocabulary: String,
}

/// One taxonomy term, real or pending.
///
/// # Identity
///
/// `tid` is an opaque id minted by the CMS; it stays empty on terms created
/// during the run until the commit phase persists them. Within one
/// vocabulary the same name can legitimately appear on several terms with
/// distinct tids; the tree disambiguates by tid on lookup.
///
/// # Child keys
///
/// The child set holds *child keys*: the child's tid when it has one, its
/// name otherwise (pending creates have no tid yet). [`TermRecord::child_key`]
/// produces the key a record contributes to its parent's set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    /// Opaque term id; empty until persisted.
    pub tid: String,
    /// Opaque vocabulary id; empty when unknown.
    pub vid: String,
    pub name: String,
    pub vocabulary: String,
    /// Parent term id; empty for roots and for parents not yet persisted.
    pub parent_tid: String,
    /// Parent term name; empty for roots.
    pub parent_name: String,
    /// Path alias carried through from the snapshot.
    pub path: String,
    /// Number of content items referencing this term.
    pub node_count: u64,
    children: BTreeSet<String>,
    pub pending_action: TermAction,
    /// Set only when `pending_action` is `Rename`.
    pub new_name: Option<String>,
    /// Set only when `pending_action` is `Merge`.
    pub merge_target: Option<MergeTarget>,
    /// True once this term has been consumed as a merge target; locked terms
    /// reject further use as a mutation source.
    pub locked: bool,
    /// Free-text annotation surfaced in reports.
    pub description: String,
}

impl TermRecord {
    /// Create a bare record for a term known only by name and vocabulary.
    pub fn new(name: impl Into<String>, vocabulary: impl Into<String>) -> Self {
        Self {
            tid: String::new(),
            vid: String::new(),
            name: name.into(),
            vocabulary: vocabulary.into(),
            parent_tid: String::new(),
            parent_name: String::new(),
            path: String::new(),
            node_count: 0,
            children: BTreeSet::new(),
            pending_action: TermAction::None,
            new_name: None,
            merge_target: None,
            locked: false,
            description: String::new(),
        }
    }

    /// The key this record contributes to its parent's child set: the tid
    /// when persisted, the name for pending creates.
    pub fn child_key(&self) -> &str {
        if self.tid.is_empty() {
            &self.name
        } else {
            &self.tid
        }
    }

    pub fn add_child(&mut self, key: impl Into<String>) {
        self.children.insert(key.into());
    }

    pub fn remove_child(&mut self, key: &str) {
        self.children.remove(key);
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_parent(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(String::as_str)
    }

    /// Flag this record as created during the run.
    pub fn mark_created(&mut self) {
        self.pending_action = TermAction::Create;
    }

    /// Flag this record for deletion.
    ///
    /// Callers must have emptied the child set first; a deleted parent would
    /// orphan its children at commit time.
    pub fn mark_deleted(&mut self) {
        debug_assert!(
            self.children.is_empty(),
            "term flagged for delete still has children"
        );
        self.pending_action = TermAction::Delete;
    }

    /// Flag this record as renamed, recording the forwarding name.
    pub fn mark_renamed(&mut self, new_name: impl Into<String>) {
        self.pending_action = TermAction::Rename;
        self.new_name = Some(new_name.into());
    }

    /// Flag this record as moved to a new parent.
    pub fn mark_moved(&mut self) {
        self.pending_action = TermAction::MoveParent;
    }

    /// Flag this record as merged away, recording the destination.
    ///
    /// Same child invariant as [`TermRecord::mark_deleted`].
    pub fn mark_merged(&mut self, target: MergeTarget) {
        debug_assert!(
            self.children.is_empty(),
            "term flagged for merge still has children"
        );
        self.pending_action = TermAction::Merge;
        self.merge_target = Some(target);
    }

    /// Whether this record has been retired under its current identity.
    pub fn is_tombstone(&self) -> bool {
        self.pending_action.is_tombstone()
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "term_test.rs"]
mod term_test;
