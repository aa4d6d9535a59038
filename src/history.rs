//! Bounded log of the command lines entered during a session.

use std::collections::VecDeque;

/// How many command lines the shell retains.
pub const DEFAULT_CAPACITY: usize = 100;

/// Append-only ring of the lines entered this session.
///
/// Once the log is full, appending drops the oldest retained line. Display
/// numbers follow insertion order over the retained lines, oldest first and
/// starting at 1, so they shift after the log wraps instead of pointing at
/// stale positions.
#[derive(Debug)]
pub struct HistoryLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl HistoryLog {
    /// Create an empty log retaining at most `capacity` lines.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a line as the newest entry, dropping the oldest one when the
    /// log is already full. Lines are stored verbatim, duplicates included.
    pub fn append(&mut self, line: impl Into<String>) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.into());
    }

    /// Retained lines with their display numbers, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.as_str()))
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
