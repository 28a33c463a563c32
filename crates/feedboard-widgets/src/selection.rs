//! Multi-select navigation state.
//!
//! `MultiSelection` tracks a cursor over a fixed number of items and the set
//! of items the user has checked. The cursor clamps at both ends instead of
//! wrapping.

use std::collections::BTreeSet;

/// Cursor plus checked set for a fixed-length list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiSelection {
    cursor: usize,
    count: usize,
    selected: BTreeSet<usize>,
}

impl MultiSelection {
    /// Cursor on the first item, nothing selected.
    pub fn new(count: usize) -> Self {
        Self {
            cursor: 0,
            count,
            selected: BTreeSet::new(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Move one item up; no-op on the first item.
    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move one item down; no-op on the last item.
    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.count {
            self.cursor += 1;
        }
    }

    /// Check the item under the cursor, or uncheck it if already checked.
    pub fn toggle(&mut self) {
        if self.count == 0 {
            return;
        }
        if !self.selected.remove(&self.cursor) {
            self.selected.insert(self.cursor);
        }
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Checked indices in ascending order.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }
}
