//! Taxonomy Tree Store
//!
//! An arena-backed index of the vocabulary forest, keyed by
//! `(vocabulary, term name)`. Each key maps to a *list* of records because
//! real-world data contains duplicate names within one vocabulary; callers
//! disambiguate with a tid.
//!
//! # Two-tier lookup
//!
//! - [`TaxonomyTree::lookup_raw`] resolves a record regardless of its
//!   pending action, used to detect duplicates, follow rename clones, and
//!   enrich processed rows with ids.
//! - [`TaxonomyTree::lookup_active`] additionally rejects tombstoned
//!   records (flagged delete/merge/rename) with a kind-specific error, so a
//!   rule can never act on a term under an identity it no longer holds.
//!
//! # Arena indices
//!
//! Lookups return a [`TermIdx`] into the arena rather than a reference; the
//! rule engine routinely needs to mutate a term, its old parent and its new
//! parent in one rule, which plain `&mut` borrows cannot express. Records
//! are never removed, so an index stays valid for the whole run.

use crate::models::{TermAction, TermRecord};
use crate::providers::{SnapshotTerm, TermSnapshotSource};
use crate::services::DryRunError;
use std::collections::HashMap;

/// Stable handle to a record in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TermIdx(usize);

/// In-memory index of the vocabulary forest for one dry run.
#[derive(Debug, Default)]
pub struct TaxonomyTree {
    records: Vec<TermRecord>,
    /// (vocabulary key, term key) -> arena slots sharing that key.
    index: HashMap<(String, String), Vec<usize>>,
}

impl TaxonomyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tree from a taxonomy snapshot.
    pub fn from_snapshot(source: &dyn TermSnapshotSource) -> anyhow::Result<Self> {
        let mut tree = Self::new();
        for row in source.load_terms()? {
            tree.insert(term_from_snapshot(row));
        }
        tracing::debug!(terms = tree.len(), "taxonomy tree seeded from snapshot");
        Ok(tree)
    }

    /// Insert a record, overwriting any existing record with the same
    /// (vocabulary, name, tid) identity.
    pub fn insert(&mut self, record: TermRecord) -> TermIdx {
        let key = Self::key_for(&record.vocabulary, &record.name);
        let bucket = self.index.entry(key).or_default();
        for &slot in bucket.iter() {
            if self.records[slot].tid == record.tid {
                self.records[slot] = record;
                return TermIdx(slot);
            }
        }
        let slot = self.records.len();
        self.records.push(record);
        bucket.push(slot);
        TermIdx(slot)
    }

    pub fn get(&self, idx: TermIdx) -> &TermRecord {
        &self.records[idx.0]
    }

    pub fn get_mut(&mut self, idx: TermIdx) -> &mut TermRecord {
        &mut self.records[idx.0]
    }

    /// Resolve a record regardless of its pending action.
    ///
    /// `Ok(None)` when the key is unknown. With an empty `tid`, a key shared
    /// by several records is an [`DryRunError::AmbiguousTerm`]; with a
    /// non-empty `tid` absent from the matched set, [`DryRunError::InvalidId`].
    pub fn lookup_raw(
        &self,
        name: &str,
        vocabulary: &str,
        tid: &str,
    ) -> Result<Option<TermIdx>, DryRunError> {
        let key = Self::key_for(vocabulary, name);
        let Some(bucket) = self.index.get(&key) else {
            return Ok(None);
        };
        if !tid.is_empty() {
            for &slot in bucket {
                if self.records[slot].tid == tid {
                    return Ok(Some(TermIdx(slot)));
                }
            }
            return Err(DryRunError::invalid_id(tid, vocabulary.trim(), name.trim()));
        }
        if bucket.len() > 1 {
            return Err(DryRunError::ambiguous_term(vocabulary.trim(), name.trim()));
        }
        Ok(bucket.first().map(|&slot| TermIdx(slot)))
    }

    /// Resolve a record under its *current* committed identity.
    ///
    /// Tombstoned records fail with the error matching their retirement, so
    /// mid-batch the caller cannot act on a term that earlier rows deleted,
    /// merged away or renamed.
    pub fn lookup_active(
        &self,
        name: &str,
        vocabulary: &str,
        tid: &str,
    ) -> Result<TermIdx, DryRunError> {
        let Some(idx) = self.lookup_raw(name, vocabulary, tid)? else {
            return Err(DryRunError::term_not_found(name.trim(), vocabulary.trim()));
        };
        let record = self.get(idx);
        match record.pending_action {
            TermAction::Delete => Err(DryRunError::TermDeleted {
                vocabulary: record.vocabulary.clone(),
                name: record.name.clone(),
            }),
            TermAction::Merge => {
                let target = record.merge_target.as_ref();
                Err(DryRunError::TermMerged {
                    vocabulary: record.vocabulary.clone(),
                    name: record.name.clone(),
                    target_vocabulary: target.map(|t| t.vocabulary.clone()).unwrap_or_default(),
                    target_name: target.map(|t| t.name.clone()).unwrap_or_default(),
                })
            }
            TermAction::Rename => Err(DryRunError::TermRenamed {
                vocabulary: record.vocabulary.clone(),
                name: record.name.clone(),
                new_name: record.new_name.clone().unwrap_or_default(),
            }),
            _ => Ok(idx),
        }
    }

    /// Whether any record at the key is still active (not tombstoned).
    /// Used by the create rule's duplicate check: a retired record does not
    /// block re-use of its old name.
    pub fn has_active(&self, name: &str, vocabulary: &str) -> bool {
        let key = Self::key_for(vocabulary, name);
        self.index
            .get(&key)
            .map(|bucket| {
                bucket
                    .iter()
                    .any(|&slot| !self.records[slot].is_tombstone())
            })
            .unwrap_or(false)
    }

    /// All raw records at the key, in insertion order. Used by the rename
    /// rule's duplicate scan, which must see tombstones too.
    pub fn records_at(&self, name: &str, vocabulary: &str) -> Vec<TermIdx> {
        let key = Self::key_for(vocabulary, name);
        self.index
            .get(&key)
            .map(|bucket| bucket.iter().map(|&slot| TermIdx(slot)).collect())
            .unwrap_or_default()
    }

    /// Total number of records, tombstones included. Also the bound for
    /// parent-chain walks: no chain can be longer than the whole tree.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate all records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &TermRecord> {
        self.records.iter()
    }

    // Keys are trimmed of surrounding whitespace; comparison is exact-match
    // post-trim (case-sensitive).
    fn key_for(vocabulary: &str, name: &str) -> (String, String) {
        (vocabulary.trim().to_string(), name.trim().to_string())
    }
}

fn term_from_snapshot(row: SnapshotTerm) -> TermRecord {
    let mut term = TermRecord::new(row.term_name, row.vocabulary_name);
    term.tid = row.tid;
    term.vid = row.vid;
    term.parent_tid = row.parent_tid;
    term.parent_name = row.parent_term_name;
    term.path = row.path;
    term.node_count = row.node_count;
    for child_tid in row.child_tids {
        term.add_child(child_tid);
    }
    term
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
