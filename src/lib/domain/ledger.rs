use super::submission::SubmissionRecord;

/// Session-scoped log of committed submissions.
///
/// Owned by the caller and passed by `&mut` into each submission. Nothing is
/// persisted: the ledger is created empty and dropped with the session.
#[derive(Debug, Clone, Default)]
pub struct SubmissionLedger {
    records: Vec<SubmissionRecord>,
}

impl SubmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: SubmissionRecord) {
        self.records.push(record);
    }

    /// Records in the order they were committed.
    pub fn records(&self) -> &[SubmissionRecord] {
        &self.records
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &SubmissionRecord> {
        self.records.iter().rev()
    }

    pub fn latest(&self) -> Option<&SubmissionRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
