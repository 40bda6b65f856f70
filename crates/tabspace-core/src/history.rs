//! Tab activation history
//!
//! A flat list of tab ids with a cursor, like a browser's back/forward
//! stack. Entries are not repaired when tabs close; the engine simply
//! ignores stale ids on replay.

use crate::types::TabId;

/// Back/forward stack over tab activations
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<TabId>,
    cursor: Option<usize>,
    replaying: bool,
    limit: usize,
}

impl HistoryStack {
    /// Create empty stack keeping at most `limit` entries
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            replaying: false,
            limit: limit.max(1),
        }
    }

    /// Record an activation
    ///
    /// Ignored while replaying and when `tab_id` is already under the
    /// cursor. Forward entries are dropped. Returns whether an entry was
    /// added.
    pub fn push(&mut self, tab_id: TabId) -> bool {
        if self.replaying {
            return false;
        }
        if let Some(cursor) = self.cursor {
            if self.entries[cursor] == tab_id {
                return false;
            }
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(tab_id);

        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
        }
        self.cursor = Some(self.entries.len() - 1);
        true
    }

    /// Move back, returning the tab to activate
    pub fn back(&mut self) -> Option<TabId> {
        let cursor = self.cursor.filter(|&c| c > 0)? - 1;
        self.cursor = Some(cursor);
        Some(self.entries[cursor])
    }

    /// Move forward, returning the tab to activate
    pub fn forward(&mut self) -> Option<TabId> {
        let cursor = self.cursor.filter(|&c| c + 1 < self.entries.len())? + 1;
        self.cursor = Some(cursor);
        Some(self.entries[cursor])
    }

    /// Check if back is possible
    #[inline]
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// Check if forward is possible
    #[inline]
    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Suppress pushes until [`Self::end_replay`]
    #[inline]
    pub fn begin_replay(&mut self) {
        self.replaying = true;
    }

    /// Re-enable pushes
    #[inline]
    pub fn end_replay(&mut self) {
        self.replaying = false;
    }

    /// Check if a replay is in progress
    #[inline]
    #[must_use]
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
        self.replaying = false;
    }

    /// Entry under the cursor
    #[must_use]
    pub fn current(&self) -> Option<TabId> {
        self.cursor.map(|c| self.entries[c])
    }

    /// All entries, oldest first
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[TabId] {
        &self.entries
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryStack {
    /// Create stack with default limit (100 entries)
    fn default() -> Self {
        Self::new(100)
    }
}
