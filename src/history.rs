//! Bounded linear undo/redo history over transform snapshots.
//!
//! Recording after an undo discards the redo branch. When the capacity is
//! exceeded the oldest entries are dropped silently and the cursor follows
//! the entry it pointed at.

use crate::constants::MAX_HISTORY_ENTRIES;
use crate::types::ArtworkTransform;
use std::collections::VecDeque;
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistoryEntry {
    pub transform: ArtworkTransform,
    pub timestamp: SystemTime,
}

#[derive(Clone, Debug)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    /// Index of the current entry; meaningless while `entries` is empty
    step: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_HISTORY_ENTRIES)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            step: 0,
            capacity: capacity.max(1),
        }
    }

    /// Append a committed transform, discarding anything after the cursor.
    pub fn record(&mut self, transform: ArtworkTransform) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.step + 1);
        }
        self.entries.push_back(HistoryEntry {
            transform,
            timestamp: SystemTime::now(),
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.step = self.entries.len() - 1;
    }

    /// Step back one entry. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<ArtworkTransform> {
        if !self.can_undo() {
            return None;
        }
        self.step -= 1;
        self.current()
    }

    /// Step forward one entry. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<ArtworkTransform> {
        if !self.can_redo() {
            return None;
        }
        self.step += 1;
        self.current()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.step > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.step + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<ArtworkTransform> {
        self.entries.get(self.step).map(|e| e.transform)
    }

    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.step)
    }

    pub fn step(&self) -> usize {
        self.step
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

    pub fn clear(&mut self) {
        self.entries.clear();
        self.step = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
