//! Dry-Run Rule Engine
//!
//! Replays an operation sheet row by row against the in-memory taxonomy
//! tree. Each rule validates its preconditions, mutates the tree to reflect
//! the pending action, and surfaces violations as [`DryRunError`]s which
//! the row-processing boundary latches onto the record; a failed row never
//! aborts the batch.
//!
//! Rows are strictly sequential: a term created in row 3 can be the parent
//! referenced in row 9, so there is no parallelism opportunity here and
//! none should be introduced.
//!
//! # Error latching
//!
//! A record keeps the *first* error it encounters. The post-rule id
//! enrichment step also runs for failed rows (reporting wants concrete ids
//! where resolvable) and its failures are latched the same way, so they can
//! never mask the rule's own error.

use crate::models::{MergeTarget, OperationRecord, TermAction, TermRecord};
use crate::operations::OperationBatch;
use crate::providers::{FieldConstraintProvider, TermSnapshotSource, VocabularyResolver};
use crate::services::error::DryRunError;
use crate::tree::{TaxonomyTree, TermIdx};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Engine-side run summary handed to the surrounding orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DryRunSummary {
    /// Rows appended to the batch (informational rows excluded).
    pub rows: usize,
    pub errors: usize,
    pub started_at: DateTime<Utc>,
}

/// The dry-run rule engine.
///
/// Owns the taxonomy tree and the accumulating batch for exactly one run;
/// the vocabulary and field collaborators are borrowed from the embedder.
pub struct DryRunEngine<'a> {
    tree: TaxonomyTree,
    batch: OperationBatch,
    vocabularies: &'a dyn VocabularyResolver,
    fields: &'a dyn FieldConstraintProvider,
    started_at: DateTime<Utc>,
}

impl<'a> DryRunEngine<'a> {
    /// Seed an engine from a taxonomy snapshot.
    pub fn new(
        snapshot: &dyn TermSnapshotSource,
        vocabularies: &'a dyn VocabularyResolver,
        fields: &'a dyn FieldConstraintProvider,
    ) -> anyhow::Result<Self> {
        let tree = TaxonomyTree::from_snapshot(snapshot)?;
        Ok(Self::with_tree(tree, vocabularies, fields))
    }

    /// Build an engine around an already-seeded tree.
    pub fn with_tree(
        tree: TaxonomyTree,
        vocabularies: &'a dyn VocabularyResolver,
        fields: &'a dyn FieldConstraintProvider,
    ) -> Self {
        Self {
            tree,
            batch: OperationBatch::new(),
            vocabularies,
            fields,
            started_at: Utc::now(),
        }
    }

    /// Process every row of a parsed sheet, in sheet order.
    pub fn process_all(&mut self, records: impl IntoIterator<Item = OperationRecord>) {
        for record in records {
            self.process(record);
        }
        tracing::info!(
            rows = self.batch.len(),
            errors = self.batch.errors().len(),
            "dry run complete"
        );
    }

    /// Process one row: dispatch the rule, enrich the record with resolved
    /// ids, and append it to the batch regardless of outcome.
    ///
    /// Rows with no action and no schema error are informational export
    /// rows; they are skipped entirely.
    pub fn process(&mut self, mut record: OperationRecord) {
        if !record.has_action() && !record.is_failed() {
            return;
        }

        if record.has_action() {
            if let Err(err) = self.apply(&record) {
                record.record_error(err.to_string());
            }
        }

        self.enrich(&mut record);

        tracing::debug!(
            action = %record.action,
            vocabulary = %record.vocabulary_name,
            term = %record.term_name,
            failed = record.is_failed(),
            "operation processed"
        );
        self.batch.add(record);
    }

    pub fn tree(&self) -> &TaxonomyTree {
        &self.tree
    }

    pub fn batch(&self) -> &OperationBatch {
        &self.batch
    }

    pub fn summary(&self) -> DryRunSummary {
        DryRunSummary {
            rows: self.batch.len(),
            errors: self.batch.errors().len(),
            started_at: self.started_at,
        }
    }

    /// Tear the engine down into its results.
    pub fn into_parts(self) -> (TaxonomyTree, OperationBatch) {
        (self.tree, self.batch)
    }

    fn apply(&mut self, record: &OperationRecord) -> Result<(), DryRunError> {
        match record.action {
            TermAction::Create => self.create(record),
            TermAction::Delete => self.delete(record),
            TermAction::Merge => self.merge(record),
            TermAction::Rename => self.rename(record),
            TermAction::MoveParent => self.move_parent(record),
            TermAction::None => Ok(()),
        }
    }

    /// Create a new term, optionally as a child of an existing (or
    /// earlier-created) parent in the same vocabulary.
    fn create(&mut self, record: &OperationRecord) -> Result<(), DryRunError> {
        let name = record.term_name.trim();
        let vocabulary = record.vocabulary_name.trim();
        let parent_name = record.parent_term_name.trim();

        // A tombstoned record at this key does not block re-use of the name.
        if self.tree.has_active(name, vocabulary) {
            return Err(DryRunError::duplicate_term(vocabulary, name));
        }

        let parent_idx = if parent_name.is_empty() {
            None
        } else {
            Some(self.tree.lookup_active(parent_name, vocabulary, "")?)
        };

        let info = self
            .vocabularies
            .resolve(vocabulary)?
            .filter(|info| !info.vid.is_empty())
            .ok_or_else(|| DryRunError::InvalidVocabulary {
                vocabulary: vocabulary.to_string(),
            })?;

        let mut term = TermRecord::new(name, vocabulary);
        term.vid = info.vid;
        term.parent_name = parent_name.to_string();
        term.mark_created();
        // New terms have no tid yet, so the parent tracks them by name.
        let child_key = term.child_key().to_string();
        self.tree.insert(term);

        if let Some(parent_idx) = parent_idx {
            self.tree.get_mut(parent_idx).add_child(child_key);
        }
        Ok(())
    }

    /// Flag a term for deletion. Children must have been moved or deleted
    /// by an earlier row.
    fn delete(&mut self, record: &OperationRecord) -> Result<(), DryRunError> {
        let idx =
            self.tree
                .lookup_active(&record.term_name, &record.vocabulary_name, &record.tid)?;

        let term = self.tree.get(idx);
        if term.locked {
            return Err(DryRunError::term_locked(&term.vocabulary, &term.name));
        }
        if term.is_parent() {
            return Err(DryRunError::has_children(
                &term.vocabulary,
                &term.name,
                "deleted",
            ));
        }

        let vocabulary = term.vocabulary.clone();
        let parent_name = term.parent_name.clone();
        let parent_tid = term.parent_tid.clone();
        let child_key = term.child_key().to_string();

        if !parent_name.is_empty() {
            let parent_idx = self.tree.lookup_active(&parent_name, &vocabulary, &parent_tid)?;
            self.tree.get_mut(parent_idx).remove_child(&child_key);
        }

        self.tree.get_mut(idx).mark_deleted();
        Ok(())
    }

    /// Rename a term: the original becomes a tombstone pointing forward,
    /// and a clone (same tid) is inserted under the new name key.
    fn rename(&mut self, record: &OperationRecord) -> Result<(), DryRunError> {
        let name = record.term_name.trim();
        let vocabulary = record.vocabulary_name.trim();
        let new_name = record.new_name.trim();

        if new_name.is_empty() {
            return Err(DryRunError::EmptyName {
                vocabulary: vocabulary.to_string(),
                name: name.to_string(),
            });
        }

        let src_idx = self.tree.lookup_active(name, vocabulary, &record.tid)?;

        if new_name == name {
            return Err(DryRunError::NoOpRename {
                vocabulary: vocabulary.to_string(),
                name: name.to_string(),
            });
        }

        // Any record already at the new key with a different tid blocks the
        // rename; tombstones included, their names are still reserved.
        let src_tid = self.tree.get(src_idx).tid.clone();
        for existing in self.tree.records_at(new_name, vocabulary) {
            if self.tree.get(existing).tid != src_tid {
                return Err(DryRunError::duplicate_term(vocabulary, new_name));
            }
        }

        let mut renamed = self.tree.get(src_idx).clone();
        renamed.name = new_name.to_string();
        renamed.description = format!("Renamed from {}", name);
        self.tree.insert(renamed);

        self.tree.get_mut(src_idx).mark_renamed(new_name);
        Ok(())
    }

    /// Re-parent a term, or promote it to a root when no target parent is
    /// given. At most one move per term per run.
    fn move_parent(&mut self, record: &OperationRecord) -> Result<(), DryRunError> {
        let idx =
            self.tree
                .lookup_active(&record.term_name, &record.vocabulary_name, &record.tid)?;

        let term = self.tree.get(idx);
        if term.pending_action == TermAction::MoveParent {
            return Err(DryRunError::AlreadyMoved {
                name: term.name.clone(),
                parent: term.parent_name.clone(),
            });
        }

        let vocabulary = term.vocabulary.clone();
        let term_name = term.name.clone();
        let term_tid = term.tid.clone();
        let old_parent_name = term.parent_name.clone();
        let old_parent_tid = term.parent_tid.clone();
        let child_key = term.child_key().to_string();

        let target_name = record.target_term_name.trim();
        let mut new_parent = None;
        if !target_name.is_empty() {
            let parent_idx =
                self.tree
                    .lookup_active(target_name, &vocabulary, &record.target_tid)?;
            let parent = self.tree.get(parent_idx);
            let parent_name = parent.name.clone();

            // A rename clone shares its source's tid, so compare tids too.
            if parent_idx == idx || (!term_tid.is_empty() && parent.tid == term_tid) {
                return Err(DryRunError::SelfParent { name: term_name });
            }
            if self.ancestors_of(parent_idx).contains(&idx) {
                return Err(DryRunError::CyclicParent {
                    name: term_name,
                    parent: parent_name,
                });
            }

            self.tree.get_mut(parent_idx).add_child(child_key.clone());
            new_parent = Some(parent_idx);
        }

        if !old_parent_name.is_empty() {
            let old_idx =
                self.tree
                    .lookup_active(&old_parent_name, &vocabulary, &old_parent_tid)?;
            self.tree.get_mut(old_idx).remove_child(&child_key);
        }

        match new_parent {
            Some(parent_idx) => {
                let parent = self.tree.get(parent_idx);
                let (parent_name, parent_tid) = (parent.name.clone(), parent.tid.clone());
                let term = self.tree.get_mut(idx);
                term.parent_name = parent_name;
                term.parent_tid = parent_tid;
            }
            None => {
                let term = self.tree.get_mut(idx);
                term.parent_name.clear();
                term.parent_tid.clear();
            }
        }
        self.tree.get_mut(idx).mark_moved();
        Ok(())
    }

    /// Merge a term's content into an existing target term, transferring
    /// node counts and locking the target against later use as a source.
    fn merge(&mut self, record: &OperationRecord) -> Result<(), DryRunError> {
        let name = record.term_name.trim();
        let vocabulary = record.vocabulary_name.trim();
        let target_name = record.target_term_name.trim();
        let target_vocabulary = record.target_vocabulary_name.trim();

        if name == target_name
            && vocabulary == target_vocabulary
            && record.tid == record.target_tid
        {
            return Err(DryRunError::SelfMerge);
        }

        let target_idx =
            self.tree
                .lookup_active(target_name, target_vocabulary, &record.target_tid)?;
        if self.tree.get(target_idx).tid.is_empty() {
            // Content items cannot point at a term with no persisted id.
            return Err(DryRunError::TargetNotCreated {
                vocabulary: target_vocabulary.to_string(),
                name: target_name.to_string(),
            });
        }

        let src_idx = self.tree.lookup_active(name, vocabulary, &record.tid)?;
        {
            let src = self.tree.get(src_idx);
            if src.locked {
                return Err(DryRunError::term_locked(&src.vocabulary, &src.name));
            }
            if src.is_parent() {
                return Err(DryRunError::has_children(&src.vocabulary, &src.name, "merged"));
            }
        }

        if target_vocabulary != vocabulary {
            self.check_cross_vocabulary_fields(record, target_vocabulary)?;
        }

        let src_count = self.tree.get(src_idx).node_count;
        self.tree.get_mut(target_idx).node_count += src_count;
        self.tree.get_mut(src_idx).node_count = 0;

        let (parent_name, parent_tid, src_vocabulary, child_key) = {
            let src = self.tree.get(src_idx);
            (
                src.parent_name.clone(),
                src.parent_tid.clone(),
                src.vocabulary.clone(),
                src.child_key().to_string(),
            )
        };
        if !parent_name.is_empty() {
            let parent_idx =
                self.tree
                    .lookup_active(&parent_name, &src_vocabulary, &parent_tid)?;
            self.tree.get_mut(parent_idx).remove_child(&child_key);
        }

        let merge_target = {
            let target = self.tree.get(target_idx);
            MergeTarget {
                tid: target.tid.clone(),
                vid: target.vid.clone(),
                name: target.name.clone(),
                vocabulary: target.vocabulary.clone(),
            }
        };
        self.tree.get_mut(src_idx).mark_merged(merge_target);

        // Lock the target against later use as a mutation *source*. A
        // second merge INTO the same target stays legal; many terms may
        // collapse into one.
        self.tree.get_mut(target_idx).locked = true;
        Ok(())
    }

    /// Cross-vocabulary merges must name the content field(s) to rewrite,
    /// and every named field must allow the target vocabulary.
    fn check_cross_vocabulary_fields(
        &self,
        record: &OperationRecord,
        target_vocabulary: &str,
    ) -> Result<(), DryRunError> {
        let info = self
            .vocabularies
            .resolve(target_vocabulary)?
            .ok_or_else(|| DryRunError::InvalidVocabulary {
                vocabulary: target_vocabulary.to_string(),
            })?;

        if record.target_field.trim().is_empty() {
            let valid_fields = self.fields.allowed_fields_for_vocabulary(&info.vid)?;
            return Err(DryRunError::MissingTargetField {
                valid_fields: valid_fields.join(", "),
            });
        }

        for field in record
            .target_field
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
        {
            let allowed = self.fields.allowed_vocabularies_for_field(field)?;
            if !allowed.contains(&info.vid) {
                let valid_fields = self.fields.allowed_fields_for_vocabulary(&info.vid)?;
                return Err(DryRunError::FieldVocabularyMismatch {
                    field: field.to_string(),
                    vocabulary: target_vocabulary.to_string(),
                    valid_fields: valid_fields.join(", "),
                });
            }
        }
        Ok(())
    }

    /// Ancestor chain of `start`, walked iteratively via parent names.
    ///
    /// Bounded by the total record count and guarded by a visited set, so
    /// the walk terminates even when the snapshot itself already contains a
    /// cycle. Lookup failures (missing, ambiguous or tombstoned parents)
    /// terminate the walk; the chain is best-effort by design.
    fn ancestors_of(&self, start: TermIdx) -> HashSet<TermIdx> {
        let mut chain = HashSet::new();
        let mut current = start;
        for _ in 0..self.tree.len() {
            let record = self.tree.get(current);
            if record.parent_name.is_empty() {
                break;
            }
            let Ok(parent_idx) =
                self.tree
                    .lookup_active(&record.parent_name, &record.vocabulary, &record.parent_tid)
            else {
                break;
            };
            if !chain.insert(parent_idx) {
                break;
            }
            current = parent_idx;
        }
        chain
    }

    /// Copy resolved identifiers from the raw tree record back onto the
    /// operation record, failed rows included. Enrichment failures are
    /// latched but can never overwrite a rule error (first error wins).
    fn enrich(&self, record: &mut OperationRecord) {
        match self
            .tree
            .lookup_raw(&record.term_name, &record.vocabulary_name, &record.tid)
        {
            Ok(Some(idx)) => {
                let term = self.tree.get(idx);
                record.tid = term.tid.clone();
                record.vid = term.vid.clone();
                record.parent_tid = term.parent_tid.clone();
                if let Some(target) = &term.merge_target {
                    record.target_vid = target.vid.clone();
                    if record.target_tid.is_empty() {
                        record.target_tid = target.tid.clone();
                    }
                }
            }
            Ok(None) => {}
            Err(err) => record.record_error(err.to_string()),
        }
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "dry_run_test.rs"]
mod dry_run_test;
