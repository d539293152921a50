//! Append-only conversation log.
//!
//! The ledger is the single source of truth for history and round counting.
//! Records are only appended, except that the most recent record may be
//! popped while it is a pending `error` or `interrupt`.

use serde::{Deserialize, Serialize};

use crate::types::{ChatRecord, ChatState};

/// Ordered sequence of [`ChatRecord`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    records: Vec<ChatRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger pre-seeded with existing records.
    pub fn with_records(records: Vec<ChatRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ChatRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&ChatRecord> {
        self.records.last()
    }

    pub(crate) fn push(&mut self, record: ChatRecord) {
        self.records.push(record);
    }

    /// Remove the tail record if, and only if, it is in `state`.
    pub(crate) fn pop_if(&mut self, state: ChatState) -> Option<ChatRecord> {
        match self.records.last() {
            Some(record) if record.state == state => self.records.pop(),
            _ => None,
        }
    }

    /// Successful records exchanged between `a` and `b`, in either direction.
    pub fn between<'a>(&'a self, a: &'a str, b: &'a str) -> impl Iterator<Item = &'a ChatRecord> + 'a {
        self.records.iter().filter(move |record| {
            record.is_success()
                && ((record.from == a && record.to == b) || (record.from == b && record.to == a))
        })
    }

    /// Successful records addressed to `to`, regardless of sender.
    pub fn addressed_to<'a>(&'a self, to: &'a str) -> impl Iterator<Item = &'a ChatRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.is_success() && record.to == to)
    }

    /// Sender of the most recent successful record addressed to `to`.
    pub fn last_sender_to(&self, to: &str) -> Option<&str> {
        self.records
            .iter()
            .rev()
            .find(|record| record.is_success() && record.to == to)
            .map(|record| record.from.as_str())
    }
}
