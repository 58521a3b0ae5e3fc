//! Log Stream
//!
//! Bounded, pausable, FIFO-evicting live tail of log entries. Overflow drops
//! the oldest entries; while paused, appends are dropped rather than queued.

use std::collections::VecDeque;

use crate::models::{LogEntry, LogLevel, Provenance};

/// Default capacity shared by every log view.
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Message of the marker entry written by `clear()`.
pub const CLEARED_MESSAGE: &str = "Security log cleared. New logs will appear here.";

#[derive(Debug, Clone)]
pub struct LogStream {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    paused: bool,
}

impl Default for LogStream {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl LogStream {
    /// Create an empty stream. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            paused: false,
        }
    }

    /// Append an entry unless paused. Returns whether it was kept.
    pub fn append(&mut self, entry: LogEntry) -> bool {
        if self.paused {
            return false;
        }
        self.push_bounded(entry);
        true
    }

    /// Convenience wrapper building the entry in place.
    pub fn push(
        &mut self,
        level: LogLevel,
        message: impl Into<String>,
        provenance: Provenance,
    ) -> bool {
        if self.paused {
            return false;
        }
        self.push_bounded(LogEntry::new(level, message, provenance));
        true
    }

    fn push_bounded(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Flip the mute and return the new state.
    pub fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Empty the buffer and leave a single "cleared" marker.
    ///
    /// The marker is written even while paused so the view never goes blank
    /// without explanation.
    pub fn clear(&mut self) -> &LogEntry {
        self.entries.clear();
        self.push_bounded(LogEntry::authoritative(LogLevel::System, CLEARED_MESSAGE));
        &self.entries[self.entries.len() - 1]
    }

    /// Replace the whole buffer. Keeps the newest `capacity` entries.
    ///
    /// Not an append: used for authoritative rewrites and therefore ignores
    /// `paused`.
    pub fn replace(&mut self, entries: impl IntoIterator<Item = LogEntry>) {
        self.entries.clear();
        for entry in entries {
            self.push_bounded(entry);
        }
    }

    /// Empty the buffer without a marker (session reset).
    pub fn reset(&mut self, capacity: usize) {
        self.entries.clear();
        self.capacity = capacity.max(1);
        self.paused = false;
    }

    /// Entries oldest first, which is also display order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
