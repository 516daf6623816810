//! Bug catalog: one record per distinct failure message.
//!
//! The failure message is the bug signature. The first crash path to
//! produce a message is kept and every later occurrence is ignored, so
//! with a breadth-first driver each record holds a shortest known path.

use crate::history::History;
use serde::Serialize;
use std::collections::HashSet;

/// A catalogued failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BugRecord<S> {
    /// Sequential ID in discovery order, starting at 0.
    pub bug_id: u64,
    /// The failure message; unique within a catalog.
    pub message: String,
    /// The full input sequence, the failing symbol included.
    pub crash_path: History<S>,
    /// Description of the target state right after the failing step.
    pub terminal_state: String,
    /// Length of the crash path.
    pub depth: usize,
}

/// Failures keyed by message, in discovery order.
#[derive(Debug, Clone)]
pub struct BugCatalog<S> {
    records: Vec<BugRecord<S>>,
    messages: HashSet<String>,
    next_bug_id: u64,
}

impl<S> BugCatalog<S> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            messages: HashSet::new(),
            next_bug_id: 0,
        }
    }

    /// Record a failure unless its message is already catalogued.
    ///
    /// Returns `true` if a new record was created.
    pub fn record(
        &mut self,
        message: impl Into<String>,
        crash_path: History<S>,
        terminal_state: impl Into<String>,
    ) -> bool {
        let message = message.into();
        if self.messages.contains(&message) {
            return false;
        }

        let depth = crash_path.len();
        self.messages.insert(message.clone());
        self.records.push(BugRecord {
            bug_id: self.next_bug_id,
            message,
            crash_path,
            terminal_state: terminal_state.into(),
            depth,
        });
        self.next_bug_id += 1;
        true
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages.contains(message)
    }

    /// Look up a record by its failure message.
    pub fn get(&self, message: &str) -> Option<&BugRecord<S>> {
        self.records.iter().find(|r| r.message == message)
    }

    /// Number of distinct failures.
    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in discovery order.
    pub fn all(&self) -> &[BugRecord<S>] {
        &self.records
    }
}

impl<S> Default for BugCatalog<S> {
    fn default() -> Self {
        Self::new()
    }
}
