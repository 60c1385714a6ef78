//! Operation Batch
//!
//! The ordered outcome of one dry run: every processed row in sheet order,
//! plus a derived error list for reporting. The batch never aborts on a
//! failed row; whether any error blocks the commit phase is the caller's
//! decision (the surrounding system blocks commit on any error).

use crate::models::OperationRecord;
use serde::{Deserialize, Serialize};

/// One row's failure, extracted for the error report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchError {
    pub vocabulary_name: String,
    pub term_name: String,
    pub message: String,
}

/// Ordered list of processed operation rows plus their errors.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OperationBatch {
    operations: Vec<OperationRecord>,
    errors: Vec<BatchError>,
}

impl OperationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a processed row. If the row carries an error, a summary tuple
    /// is also added to the error list; the row itself is appended either
    /// way so the batch preserves the full sheet in order.
    pub fn add(&mut self, record: OperationRecord) {
        if let Some(message) = &record.error {
            self.errors.push(BatchError {
                vocabulary_name: record.vocabulary_name.clone(),
                term_name: record.term_name.clone(),
                message: message.clone(),
            });
        }
        self.operations.push(record);
    }

    pub fn operations(&self) -> &[OperationRecord] {
        &self.operations
    }

    pub fn errors(&self) -> &[BatchError] {
        &self.errors
    }

    /// Commit gate: a batch with any error must not be committed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OperationRecord> {
        self.operations.iter()
    }
}

impl<'a> IntoIterator for &'a OperationBatch {
    type Item = &'a OperationRecord;
    type IntoIter = std::slice::Iter<'a, OperationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
