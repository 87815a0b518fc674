// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Tune list browser state.
//!
//! This module tracks the highlighted row of the tune list and the window of
//! rows currently on screen. Only the visible window is ever rendered, so the
//! list stays responsive with every tune of the collection in view.

#[derive(Debug, Default)]
pub(crate) struct TuneBrowser {
    len: usize,
    selected: usize,
    offset: usize,
    page_size: usize,
}

impl TuneBrowser {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            len,
            page_size: 1,
            ..Self::default()
        }
    }

    /// Starts over with a list of `len` rows, highlighting the first.
    pub(crate) fn reset(&mut self, len: usize) {
        self.len = len;
        self.selected = 0;
        self.offset = 0;
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The highlighted row, `None` if the list is empty.
    pub(crate) fn selected(&self) -> Option<usize> {
        (self.len > 0).then_some(self.selected)
    }

    /// The first visible row.
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Sets the number of visible rows and scrolls to keep the highlighted
    /// row in view.
    pub(crate) fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
        self.scroll_to_selected();
    }

    pub(crate) fn next(&mut self) {
        self.select(self.selected.saturating_add(1));
    }

    pub(crate) fn previous(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub(crate) fn page_down(&mut self) {
        self.select(self.selected.saturating_add(self.page_size));
    }

    pub(crate) fn page_up(&mut self) {
        self.select(self.selected.saturating_sub(self.page_size));
    }

    pub(crate) fn first(&mut self) {
        self.select(0);
    }

    pub(crate) fn last(&mut self) {
        self.select(usize::MAX);
    }

    fn select(&mut self, row: usize) {
        self.selected = row.min(self.len.saturating_sub(1));
        self.scroll_to_selected();
    }

    fn scroll_to_selected(&mut self) {
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + self.page_size {
            self.offset = self.selected + 1 - self.page_size;
        }
        self.offset = self.offset.min(self.len.saturating_sub(self.page_size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser(len: usize, page_size: usize) -> TuneBrowser {
        let mut browser = TuneBrowser::new(len);
        browser.set_page_size(page_size);
        browser
    }

    #[test]
    fn test_empty() {
        let mut browser = browser(0, 10);

        browser.next();
        browser.last();

        assert_eq!(browser.selected(), None);
        assert_eq!(browser.offset(), 0);
    }

    #[test]
    fn test_moves_stop_at_ends() {
        let mut browser = browser(3, 10);

        browser.previous();
        assert_eq!(browser.selected(), Some(0));

        browser.next();
        browser.next();
        browser.next();
        assert_eq!(browser.selected(), Some(2));
    }

    #[test]
    fn test_scrolls_with_selection() {
        let mut browser = browser(100, 10);

        for _ in 0..12 {
            browser.next();
        }
        assert_eq!(browser.selected(), Some(12));
        assert_eq!(browser.offset(), 3);

        browser.page_up();
        assert_eq!(browser.selected(), Some(2));
        assert_eq!(browser.offset(), 2);
    }

    #[test]
    fn test_paging() {
        let mut browser = browser(25, 10);

        browser.page_down();
        browser.page_down();
        assert_eq!(browser.selected(), Some(20));
        assert_eq!(browser.offset(), 11);

        browser.page_down();
        assert_eq!(browser.selected(), Some(24));

        browser.first();
        assert_eq!(browser.selected(), Some(0));
        assert_eq!(browser.offset(), 0);
    }

    #[test]
    fn test_resize_keeps_selection_visible() {
        let mut browser = browser(100, 20);
        browser.last();
        assert_eq!(browser.offset(), 80);

        browser.set_page_size(5);
        assert_eq!(browser.offset(), 95);

        browser.set_page_size(50);
        assert_eq!(browser.offset(), 50);
        assert_eq!(browser.selected(), Some(99));
    }

    #[test]
    fn test_reset() {
        let mut browser = browser(100, 10);
        browser.last();

        browser.reset(4);

        assert_eq!(browser.selected(), Some(0));
        assert_eq!(browser.offset(), 0);
        assert_eq!(browser.len(), 4);
    }
}
