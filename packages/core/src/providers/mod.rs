//! Collaborator Contracts
//!
//! The dry run engine never talks to the CMS directly. Three narrow traits
//! define everything it needs from the surrounding system:
//!
//! - [`TermSnapshotSource`] - a one-shot, read-only export of the current
//!   taxonomy, used to seed the tree at the start of a run
//! - [`VocabularyResolver`] - "does this vocabulary name exist, and what is
//!   its id"
//! - [`FieldConstraintProvider`] - "which vocabularies may this content
//!   field hold" and the reverse, used by the cross-vocabulary merge rule
//!   and its error messages
//!
//! All methods are synchronous: the dry run is a single-threaded,
//! in-process pass, and the providers are expected to be
//! either in-memory or to block on their own I/O. Failures are collaborator
//! failures, not business-rule violations, so they surface as
//! `anyhow::Result` and get wrapped into `DryRunError::Provider` at the
//! rule boundary.
//!
//! [`StaticDirectory`] is an in-memory implementation for tests and for
//! embedders that do not sit on a CMS.

mod directory;

pub use directory::{machine_name, StaticDirectory};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One term row of the taxonomy snapshot used to seed the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTerm {
    pub vocabulary_name: String,
    pub term_name: String,
    pub tid: String,
    pub vid: String,
    pub parent_tid: String,
    pub parent_term_name: String,
    pub path: String,
    pub node_count: u64,
    /// Tids of this term's direct children.
    #[serde(default)]
    pub child_tids: Vec<String>,
}

/// Point-in-time export of the taxonomy. Called once per run.
pub trait TermSnapshotSource {
    fn load_terms(&self) -> Result<Vec<SnapshotTerm>>;
}

/// A resolved vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyInfo {
    /// Opaque vocabulary id.
    pub vid: String,
    pub machine_name: String,
}

/// Resolves vocabulary names to their persisted identity.
pub trait VocabularyResolver {
    /// `Ok(None)` means the vocabulary does not exist; that is a
    /// business-rule outcome, not a provider failure.
    fn resolve(&self, vocabulary_name: &str) -> Result<Option<VocabularyInfo>>;
}

/// Answers which vocabularies a term-reference field may hold.
pub trait FieldConstraintProvider {
    /// Vocabulary ids the named field accepts. Unknown fields yield an
    /// empty set.
    fn allowed_vocabularies_for_field(&self, field_name: &str) -> Result<BTreeSet<String>>;

    /// Field names that accept the given vocabulary id, used to compose
    /// actionable error messages.
    fn allowed_fields_for_vocabulary(&self, vid: &str) -> Result<Vec<String>>;
}

impl TermSnapshotSource for Vec<SnapshotTerm> {
    fn load_terms(&self) -> Result<Vec<SnapshotTerm>> {
        Ok(self.clone())
    }
}
