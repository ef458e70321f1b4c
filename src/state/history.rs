//! Undo/Redo History
//!
//! Linear history over whole-state snapshots. Each entry stores a complete
//! copy of the state it replaced, so restoring never has to replay edits.
//! Pushing a new state always discards the redo side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default maximum number of undo levels to keep.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 50;

/// A snapshot parked on one of the two stacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry<T> {
    /// Unique identifier for this entry.
    pub id: String,

    /// Label of the edit that produced the entry (e.g. "Add track").
    pub label: String,

    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// The complete state at that point.
    pub state: T,
}

impl<T> HistoryEntry<T> {
    fn new(label: impl Into<String>, state: T) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            timestamp: Utc::now(),
            state,
        }
    }
}

/// Past, present and future of a value.
///
/// Invariants:
/// - `push` empties the future
/// - `undo` moves the present onto the future and pops the past
/// - `redo` moves the present onto the past and pops the future
#[derive(Debug, Clone)]
pub struct History<T> {
    past: Vec<HistoryEntry<T>>,
    present: T,
    /// Most recently undone entry is last.
    future: Vec<HistoryEntry<T>>,
    max_levels: usize,
}

impl<T: Clone> History<T> {
    pub fn new(present: T) -> Self {
        Self::with_max_levels(present, DEFAULT_MAX_UNDO_LEVELS)
    }

    pub fn with_max_levels(present: T, max_levels: usize) -> Self {
        Self {
            past: Vec::new(),
            present,
            future: Vec::new(),
            max_levels,
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Adopt `next`, parking the current state on the past stack.
    pub fn push(&mut self, label: impl Into<String>, next: T) {
        let previous = std::mem::replace(&mut self.present, next);
        self.record(label, previous);
    }

    /// Park an earlier snapshot as the undo target for the current state.
    ///
    /// Used when the present was reached through transient edits (a region
    /// drag) that should collapse into a single undo step.
    pub fn commit_from(&mut self, label: impl Into<String>, before: T) {
        self.record(label, before);
    }

    /// Replace the present without touching either stack.
    pub fn replace_present(&mut self, next: T) {
        self.present = next;
    }

    fn record(&mut self, label: impl Into<String>, previous: T) {
        self.future.clear();
        self.past.push(HistoryEntry::new(label, previous));
        self.trim();
    }

    /// Step back one entry. Returns the label that was undone, or `None`
    /// when there is nothing to undo.
    pub fn undo(&mut self) -> Option<String> {
        let entry = self.past.pop()?;
        let label = entry.label.clone();
        let current = std::mem::replace(&mut self.present, entry.state);
        self.future.push(HistoryEntry {
            id: entry.id,
            label: entry.label,
            timestamp: Utc::now(),
            state: current,
        });
        Some(label)
    }

    /// Step forward one entry. Returns the label that was redone, or `None`
    /// when there is nothing to redo.
    pub fn redo(&mut self) -> Option<String> {
        let entry = self.future.pop()?;
        let label = entry.label.clone();
        let current = std::mem::replace(&mut self.present, entry.state);
        self.past.push(HistoryEntry {
            id: entry.id,
            label: entry.label,
            timestamp: Utc::now(),
            state: current,
        });
        Some(label)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.past.len()
    }

    pub fn redo_count(&self) -> usize {
        self.future.len()
    }

    /// Past snapshots, oldest first.
    pub fn past(&self) -> impl Iterator<Item = &T> {
        self.past.iter().map(|e| &e.state)
    }

    /// Future snapshots, next-to-redo first.
    pub fn future(&self) -> impl Iterator<Item = &T> {
        self.future.iter().rev().map(|e| &e.state)
    }

    /// Labels of the undo stack, most recent first.
    pub fn undo_labels(&self) -> Vec<&str> {
        self.past.iter().rev().map(|e| e.label.as_str()).collect()
    }

    fn trim(&mut self) {
        if self.past.len() > self.max_levels {
            let excess = self.past.len() - self.max_levels;
            self.past.drain(..excess);
        }
    }
}
