//! Append-only step log.

use serde::Serialize;
use tracing::trace;

use super::StepRecord;

/// Ordered record of every step ingested for one solve.
///
/// Records are only ever appended. Indices handed out by
/// [`StepLog::append`] stay valid for the life of the log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StepLog {
    records: Vec<StepRecord>,
}

impl StepLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns its index.
    pub fn append(&mut self, record: StepRecord) -> usize {
        let index = self.records.len();
        trace!(index, kind = %record.kind(), "Appending step");
        self.records.push(record);
        index
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`.
    pub fn get(&self, index: usize) -> Option<&StepRecord> {
        self.records.get(index)
    }

    /// All records as a slice.
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Iterates records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, StepRecord> {
        self.records.iter()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&StepRecord> {
        self.records.last()
    }
}

impl<'a> IntoIterator for &'a StepLog {
    type Item = &'a StepRecord;
    type IntoIter = std::slice::Iter<'a, StepRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
