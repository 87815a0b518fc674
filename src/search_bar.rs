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

//! Search line input.
//!
//! This module wraps a text input component for the search line. Every key
//! press is reported back as a [`SearchOutcome`] so the caller can refilter
//! as the query is typed.

use crossterm::event::{Event, KeyCode};
use tui_input::{Input, backend::crossterm::EventHandler};

#[derive(Debug, PartialEq)]
pub(crate) enum SearchOutcome {
    /// The query text changed.
    Changed,
    /// Searching finished, keep the query.
    Accepted,
    /// Searching abandoned, the query has been cleared.
    Cancelled,
    Unchanged,
}

#[derive(Default)]
pub(crate) struct SearchBar {
    pub(crate) input: Input,
}

impl SearchBar {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn value(&self) -> &str {
        self.input.value()
    }

    pub(crate) fn handle_event(&mut self, event: &Event) -> SearchOutcome {
        let Event::Key(key_event) = event else {
            return SearchOutcome::Unchanged;
        };

        match key_event.code {
            KeyCode::Enter => SearchOutcome::Accepted,

            KeyCode::Esc => {
                self.input.reset();
                SearchOutcome::Cancelled
            }

            // Delegate everything else to the managed input component
            _ => match self.input.handle_event(event) {
                Some(changed) if changed.value => SearchOutcome::Changed,
                _ => SearchOutcome::Unchanged,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_typing_changes_query() {
        let mut search_bar = SearchBar::new();

        assert_eq!(search_bar.handle_event(&key(KeyCode::Char('h'))), SearchOutcome::Changed);
        assert_eq!(search_bar.handle_event(&key(KeyCode::Char('i'))), SearchOutcome::Changed);
        assert_eq!(search_bar.value(), "hi");

        assert_eq!(search_bar.handle_event(&key(KeyCode::Backspace)), SearchOutcome::Changed);
        assert_eq!(search_bar.value(), "h");
    }

    #[test]
    fn test_cursor_movement_is_not_a_change() {
        let mut search_bar = SearchBar::new();
        search_bar.handle_event(&key(KeyCode::Char('a')));

        assert_eq!(search_bar.handle_event(&key(KeyCode::Left)), SearchOutcome::Unchanged);
        assert_eq!(search_bar.value(), "a");
    }

    #[test]
    fn test_enter_keeps_query() {
        let mut search_bar = SearchBar::new();
        search_bar.handle_event(&key(KeyCode::Char('a')));

        assert_eq!(search_bar.handle_event(&key(KeyCode::Enter)), SearchOutcome::Accepted);
        assert_eq!(search_bar.value(), "a");
    }

    #[test]
    fn test_escape_clears_query() {
        let mut search_bar = SearchBar::new();
        search_bar.handle_event(&key(KeyCode::Char('a')));

        assert_eq!(search_bar.handle_event(&key(KeyCode::Esc)), SearchOutcome::Cancelled);
        assert_eq!(search_bar.value(), "");
    }
}
