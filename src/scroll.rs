// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Cursor and viewport bookkeeping for virtually scrolled lists.
//!
//! The list itself lives elsewhere; `ScrollState` only knows its length.

/// Scroll state over an abstract list of `total` items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    /// Currently selected item index
    pub cursor: usize,
    /// First visible item index
    pub offset: usize,
    /// Total number of items in the list
    pub total: usize,
    /// Number of rows the viewport can show
    pub visible_rows: usize,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all fields to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Update the list length, clamping the cursor into range
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        if self.cursor >= total {
            self.cursor = total.saturating_sub(1);
        }
        self.ensure_visible();
    }

    /// Update the viewport height
    pub fn set_visible_rows(&mut self, rows: usize) {
        self.visible_rows = rows;
        self.ensure_visible();
    }

    /// Place the cursor at `index` (clamped) and scroll to it
    pub fn select(&mut self, index: usize) {
        if self.total == 0 {
            return;
        }
        self.cursor = index.min(self.total - 1);
        self.ensure_visible();
    }

    /// Adjust the offset so the cursor is inside the viewport
    pub fn ensure_visible(&mut self) {
        if self.total == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }

        if self.cursor < self.offset {
            self.offset = self.cursor;
        }
        if self.visible_rows > 0 && self.cursor >= self.offset + self.visible_rows {
            self.offset = self.cursor + 1 - self.visible_rows;
        }

        let max_offset = self.total.saturating_sub(self.visible_rows);
        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }

    /// Move the cursor by `delta`, clamped to the list bounds
    pub fn move_by(&mut self, delta: isize) {
        if self.total == 0 {
            return;
        }
        let target = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta as usize)
        };
        self.cursor = target.min(self.total - 1);
        self.ensure_visible();
    }

    /// Move by one viewport in `direction` (negative = up)
    pub fn page(&mut self, direction: isize) {
        if self.total == 0 {
            return;
        }
        let page = self.visible_rows.max(1) as isize;
        self.move_by(direction.signum() * page);
    }

    /// Jump to the first item
    pub fn to_top(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    /// Jump to the last item
    pub fn to_bottom(&mut self) {
        if self.total == 0 {
            return;
        }
        self.cursor = self.total - 1;
        self.ensure_visible();
    }

    /// Index range of the rows currently inside the viewport
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let end = (self.offset + self.visible_rows).min(self.total);
        self.offset.min(end)..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(total: usize, visible_rows: usize) -> ScrollState {
        ScrollState {
            total,
            visible_rows,
            ..ScrollState::default()
        }
    }

    #[test]
    fn test_move_clamps_to_bounds() {
        let mut s = state(5, 3);
        s.move_by(-3);
        assert_eq!(s.cursor, 0);
        s.move_by(10);
        assert_eq!(s.cursor, 4);
        assert_eq!(s.offset, 2);
    }

    #[test]
    fn test_cursor_stays_in_viewport() {
        let mut s = state(100, 10);
        for _ in 0..25 {
            s.move_by(1);
            assert!(s.cursor >= s.offset && s.cursor < s.offset + s.visible_rows);
        }
        assert_eq!(s.cursor, 25);
        assert_eq!(s.offset, 16);

        s.move_by(-20);
        assert_eq!(s.cursor, 5);
        assert_eq!(s.offset, 5);
    }

    #[test]
    fn test_page_and_jumps() {
        let mut s = state(30, 10);
        s.page(1);
        assert_eq!(s.cursor, 10);
        s.page(1);
        s.page(1);
        assert_eq!(s.cursor, 29);
        assert_eq!(s.offset, 20);
        s.page(-1);
        assert_eq!(s.cursor, 19);

        s.to_top();
        assert_eq!((s.cursor, s.offset), (0, 0));
        s.to_bottom();
        assert_eq!((s.cursor, s.offset), (29, 20));
    }

    #[test]
    fn test_empty_list_is_inert() {
        let mut s = state(0, 10);
        s.move_by(3);
        s.page(1);
        s.to_bottom();
        assert_eq!((s.cursor, s.offset), (0, 0));
        assert!(s.visible_range().is_empty());
    }

    #[test]
    fn test_shrinking_total_clamps_cursor() {
        let mut s = state(50, 10);
        s.to_bottom();
        s.set_total(12);
        assert_eq!(s.cursor, 11);
        assert_eq!(s.offset, 2);
        assert_eq!(s.visible_range(), 2..12);
    }

    #[test]
    fn test_offset_clamped_when_list_fits() {
        let mut s = state(4, 10);
        s.offset = 3;
        s.ensure_visible();
        assert_eq!(s.offset, 0);
    }
}
