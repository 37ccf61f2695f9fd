//! Recent processing history

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;

/// Maximum number of entries kept
pub const MAX_HISTORY_ENTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Local>,
    pub source_name: String,
    pub node_count: usize,
}

impl fmt::Display for HistoryEntry {
    /// `[HH:MM:SS] Processed <source> with <n> nodes`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Processed {} with {} nodes",
            self.timestamp.format("%H:%M:%S"),
            self.source_name,
            self.node_count
        )
    }
}

/// Newest-first ring of the last few submissions
#[derive(Debug, Clone, Default)]
pub struct ProcessingHistory {
    entries: VecDeque<HistoryEntry>,
}

impl ProcessingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, source_name: impl Into<String>, node_count: usize) -> &HistoryEntry {
        self.record_at(Local::now(), source_name, node_count)
    }

    pub fn record_at(
        &mut self,
        timestamp: DateTime<Local>,
        source_name: impl Into<String>,
        node_count: usize,
    ) -> &HistoryEntry {
        self.entries.push_front(HistoryEntry {
            timestamp,
            source_name: source_name.into(),
            node_count,
        });
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        &self.entries[0]
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Rendered lines, newest first
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
