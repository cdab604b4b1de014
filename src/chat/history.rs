//! The history store: the server's list of past exchanges.

use crate::types::HistoryRecord;

/// Holds the most recently applied history list.
///
/// The list is only ever replaced wholesale.  Every refresh takes a ticket
/// before its request goes out; a response is applied only if its ticket is
/// newer than the one behind the current list, so a slow response never
/// overwrites a fresher one.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    records: Vec<HistoryRecord>,
    issued: u64,
    applied: u64,
}

impl HistoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The records in server order.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// The record at `index` in display order.
    pub fn get(&self, index: usize) -> Option<&HistoryRecord> {
        self.records.get(index)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records have been applied.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hands out the ticket for a refresh about to start.
    pub(crate) fn issue_ticket(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Replaces the list if `ticket` is newer than the applied one.
    ///
    /// Returns false when the response was stale and dropped.
    pub(crate) fn apply(&mut self, ticket: u64, records: Vec<HistoryRecord>) -> bool {
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        self.records = records;
        true
    }
}
