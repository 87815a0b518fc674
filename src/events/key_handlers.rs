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

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    App, Mode,
    events::{AppEvent, handlers::*},
    search_bar::SearchOutcome,
};

pub(super) fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.event_tx.send(AppEvent::ExitApplication)?;
        return Ok(());
    }

    match app.mode {
        Mode::Browse => process_browse_key_event(app, key),
        Mode::Search => process_search_key_event(app, key),
    }
}

fn process_browse_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.event_tx.send(AppEvent::ExitApplication)?;
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.browser.next(),
        KeyCode::Char('k') | KeyCode::Up => app.browser.previous(),
        KeyCode::PageDown => app.browser.page_down(),
        KeyCode::PageUp => app.browser.page_up(),
        KeyCode::Home => app.browser.first(),
        KeyCode::End => app.browser.last(),

        // Playback
        KeyCode::Enter => play_selected_tune(app)?,
        KeyCode::Char('+') => change_song(app, 1)?,
        KeyCode::Char('-') => change_song(app, -1)?,
        KeyCode::Delete => stop_playback(app)?,

        KeyCode::Char('/') => app.mode = Mode::Search,

        _ => {}
    }

    Ok(())
}

fn process_search_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    match app.search_bar.handle_event(&Event::Key(key)) {
        SearchOutcome::Changed => {
            let query = app.search_bar.value().to_string();
            apply_filter(app, &query);
        }
        SearchOutcome::Accepted => app.mode = Mode::Browse,
        SearchOutcome::Cancelled => {
            apply_filter(app, "");
            app.mode = Mode::Browse;
        }
        SearchOutcome::Unchanged => {}
    }

    Ok(())
}
