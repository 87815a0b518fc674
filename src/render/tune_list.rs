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

//! Render the tune list.
//!
//! Only the rows inside the visible window of the filtered view are built on
//! each frame.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Cell, Paragraph, Row, Table, TableState},
};

use crate::{App, util::format::format_years};

// Header row plus its bottom margin
const HEADER_HEIGHT: u16 = 2;

pub(crate) fn draw_tune_list(f: &mut Frame, area: Rect, app: &mut App) {
    let page_size = area.height.saturating_sub(HEADER_HEIGHT) as usize;
    app.browser.set_page_size(page_size);

    let theme = &app.theme;
    let offset = app.browser.offset();
    let playing = app.now_playing.as_ref().map(|now_playing| now_playing.position);

    let rows = app
        .filter
        .view()
        .slice(&app.catalog, offset..offset + page_size)
        .map(|tune| {
            let name_style = if playing == Some(tune.index) {
                Style::default()
                    .fg(theme.accent_colour)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.table_name_fg)
            };

            Row::new(vec![
                Cell::from(Line::from(tune.title()).style(name_style)),
                Cell::from(Line::from(tune.author()).style(Style::default().fg(theme.table_author_fg))),
                Cell::from(Line::from(tune.header.released.as_str()).style(Style::default().fg(theme.table_released_fg))),
                Cell::from(
                    Line::from(format_years(tune.year_min, tune.year_max))
                        .style(Style::default().fg(theme.table_year_fg))
                        .alignment(Alignment::Right),
                ),
            ])
        });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Percentage(40),
            Constraint::Length(7),
        ],
    )
    .header(
        Row::new(vec![
            Cell::from("Name"),
            Cell::from("Author"),
            Cell::from("Released"),
            Cell::from(Line::from("Year").alignment(Alignment::Right)),
        ])
        .style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(theme.accent_colour),
        )
        .bottom_margin(1),
    )
    .row_highlight_style(Style::default().bg(theme.highlight_colour).fg(Color::White))
    .block(Block::default());

    let mut state = TableState::default()
        .with_selected(app.browser.selected().map(|selected| selected.saturating_sub(offset)));

    f.render_stateful_widget(table, area, &mut state);

    if app.filter.view().is_empty() && area.height > HEADER_HEIGHT {
        let message = Rect {
            y: area.y + HEADER_HEIGHT,
            height: 1,
            ..area
        };
        f.render_widget(
            Paragraph::new("No matching tunes").style(Style::default().fg(theme.table_year_fg)),
            message,
        );
    }
}
