//! In-Memory Vocabulary/Field Directory
//!
//! A `StaticDirectory` holds the vocabulary registry and the field/vocabulary
//! allow-lists as plain maps. Tests build one in a few lines; embedders
//! without a CMS can load one from configuration.

use crate::providers::{FieldConstraintProvider, VocabularyInfo, VocabularyResolver};
use anyhow::Result;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

// Characters outside this class collapse to underscores in machine names.
const MACHINE_NAME_PATTERN: &str = r"[^a-zA-Z0-9_]+";

/// Derive a machine name from a human-readable vocabulary name:
/// non-alphanumeric runs become underscores, the result is lowercased.
pub fn machine_name(name: &str) -> String {
    static MACHINE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = MACHINE_NAME_REGEX.get_or_init(|| Regex::new(MACHINE_NAME_PATTERN).unwrap());
    regex.replace_all(name, "_").to_lowercase()
}

/// In-memory implementation of [`VocabularyResolver`] and
/// [`FieldConstraintProvider`].
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    /// Vocabulary name -> vid.
    vocabularies: BTreeMap<String, String>,
    /// Field name -> vids the field accepts.
    field_vocabularies: BTreeMap<String, BTreeSet<String>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vocabulary under the given name and id.
    pub fn with_vocabulary(mut self, name: impl Into<String>, vid: impl Into<String>) -> Self {
        self.vocabularies.insert(name.into(), vid.into());
        self
    }

    /// Register a term-reference field and the vocabulary ids it accepts.
    pub fn with_field<I, S>(mut self, field_name: impl Into<String>, vids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_vocabularies.insert(
            field_name.into(),
            vids.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl VocabularyResolver for StaticDirectory {
    fn resolve(&self, vocabulary_name: &str) -> Result<Option<VocabularyInfo>> {
        Ok(self.vocabularies.get(vocabulary_name).map(|vid| {
            VocabularyInfo {
                vid: vid.clone(),
                machine_name: machine_name(vocabulary_name),
            }
        }))
    }
}

impl FieldConstraintProvider for StaticDirectory {
    fn allowed_vocabularies_for_field(&self, field_name: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .field_vocabularies
            .get(field_name)
            .cloned()
            .unwrap_or_default())
    }

    fn allowed_fields_for_vocabulary(&self, vid: &str) -> Result<Vec<String>> {
        Ok(self
            .field_vocabularies
            .iter()
            .filter(|(_, vids)| vids.contains(vid))
            .map(|(field, _)| field.clone())
            .collect())
    }
}
