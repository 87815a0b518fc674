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

//! Render the footer line.
//!
//! The left side holds the search line while searching (or while a search
//! is applied), otherwise any error message or the playing tune. The right
//! side shows the collection release and the position in the filtered list.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
};

use crate::{App, Mode, render::icons::ICON_SEARCH};

pub(crate) fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.browser.selected().map_or(0, |selected| selected + 1);
    let position = format!(
        "HVSC #{}  {}/{}",
        app.catalog.release(),
        selected,
        app.browser.len()
    );

    let container = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(position.len() as u16 + 1),
        ])
        .horizontal_margin(1)
        .split(area);

    let searching = app.mode == Mode::Search;

    if searching || !app.filter.view().query().is_empty() {
        f.render_widget(
            Paragraph::new(format!("{}{}", ICON_SEARCH, app.search_bar.value())).style(
                Style::default()
                    .fg(app.theme.search_colour)
                    .bg(app.theme.gauge_track_colour),
            ),
            container[0],
        );
    } else if let Some(status) = &app.status {
        f.render_widget(
            Paragraph::new(status.as_str()).style(Style::default().fg(Color::LightRed)),
            container[0],
        );
    } else if let Some(tune) = app
        .now_playing
        .as_ref()
        .and_then(|now_playing| app.catalog.get(now_playing.position))
    {
        f.render_widget(
            Paragraph::new(format!("{} - {}", tune.title(), tune.author()))
                .style(Style::default().fg(app.theme.table_name_fg)),
            container[0],
        );
    }

    f.render_widget(
        Paragraph::new(position)
            .alignment(Alignment::Right)
            .style(Style::default().fg(app.theme.table_year_fg)),
        container[1],
    );

    if searching {
        let cursor_x = container[0].x + ICON_SEARCH.len() as u16 + app.search_bar.input.cursor() as u16;
        let cursor_y = container[0].y;
        f.set_cursor_position((cursor_x, cursor_y));
    }
}
