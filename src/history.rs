//! Bounded undo history over collection snapshots.
//!
//! The history is a linear log of deep snapshots with a movable position.
//! Entry 0 is the state the history was seeded with; every committed
//! mutation appends one entry. Undo and redo return copies that the caller
//! installs as the new canonical collection; the history never mutates the
//! live collection itself.

use crate::model::Annotation;

/// Maximum number of snapshots retained.
pub const MAX_HISTORY_SNAPSHOTS: usize = 50;

/// A saved copy of the full annotation collection.
pub type Snapshot = Vec<Annotation>;

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    position: usize,
    max_entries: usize,
}

impl History {
    /// Seed the history with the initial collection state.
    pub fn new(initial: Snapshot) -> Self {
        Self::with_capacity(initial, MAX_HISTORY_SNAPSHOTS)
    }

    /// Seed with an explicit snapshot cap (at least 1).
    pub fn with_capacity(initial: Snapshot, max_entries: usize) -> Self {
        Self {
            entries: vec![initial],
            position: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Record a snapshot after a committed mutation.
    ///
    /// Entries past the current position are discarded first: mutating after
    /// an undo rewrites the future. When the log exceeds its cap the oldest
    /// entry is evicted and the position shifts down with it.
    pub fn record(&mut self, snapshot: &[Annotation]) {
        self.entries.truncate(self.position + 1);
        self.entries.push(snapshot.to_vec());
        self.position += 1;
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
            self.position -= 1;
            log::debug!("History full, evicted oldest snapshot");
        }
        log::debug!(
            "Recorded snapshot {}/{}",
            self.position + 1,
            self.entries.len()
        );
    }

    /// Step back one snapshot. None when already at the oldest entry.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.position -= 1;
        log::debug!("Undo to snapshot {}/{}", self.position + 1, self.entries.len());
        Some(self.entries[self.position].clone())
    }

    /// Step forward one snapshot. None when already at the newest entry.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.position += 1;
        log::debug!("Redo to snapshot {}/{}", self.position + 1, self.entries.len());
        Some(self.entries[self.position].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position + 1 < self.entries.len()
    }

    /// Number of retained snapshots, the seed entry included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current position in the log (0 = oldest retained snapshot).
    pub fn position(&self) -> usize {
        self.position
    }
}
