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

//! Render the player panel.
//!
//! This module renders the playing tune, the selected song and elapsed time,
//! and a progress bar when the song length is known.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use crate::{
    App,
    player::PlayerState,
    render::icons::{ICON_PLAY, ICON_STOP},
    util::format::format_time,
};

/// Renders the player widget including tune info and progress.
pub(crate) fn draw_player(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let Some(now_playing) = &app.now_playing else {
        return;
    };
    let Some(tune) = app.catalog.get(now_playing.position) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let info_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(16)])
        .split(chunks[0]);

    let icon = match app.player_state {
        PlayerState::Playing => ICON_PLAY,
        PlayerState::Stopped => ICON_STOP,
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let tune_line = Line::from(vec![
        Span::styled(format!(" {} ", icon), bold).fg(Color::White),
        Span::styled(tune.title(), bold).fg(app.theme.accent_colour),
        Span::raw(" by "),
        Span::styled(tune.author(), bold).fg(app.theme.accent_colour),
    ]);
    f.render_widget(Paragraph::new(tune_line), info_chunks[0]);

    let song_line = Line::from(vec![
        Span::raw("Song "),
        Span::styled(now_playing.song.to_string(), bold).fg(app.theme.accent_colour),
        Span::raw("/"),
        Span::styled(tune.header.songs.to_string(), bold).fg(app.theme.accent_colour),
    ]);
    f.render_widget(
        Paragraph::new(song_line).alignment(Alignment::Right),
        info_chunks[1],
    );

    let detail_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(16)])
        .split(chunks[1]);

    let mut detail_line = Line::from(Span::raw(format!("   {}", tune.header.released)))
        .fg(app.theme.table_released_fg);
    if let Some(note) = tune.stil.lines().next() {
        detail_line.push_span(Span::raw(format!("  {}", note.trim())).fg(app.theme.table_year_fg));
    }
    f.render_widget(Paragraph::new(detail_line), detail_chunks[0]);

    let length = now_playing
        .length
        .map(format_time)
        .unwrap_or_else(|| "--:--".to_string());

    let time_line = Line::from(vec![
        Span::styled(format_time(now_playing.elapsed()), bold).fg(app.theme.accent_colour),
        Span::styled(" / ", bold).fg(Color::White),
        Span::styled(length, bold).fg(app.theme.accent_colour),
    ]);
    f.render_widget(
        Paragraph::new(time_line).alignment(Alignment::Right),
        detail_chunks[1],
    );

    let position_gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(app.theme.accent_colour)
                .bg(app.theme.gauge_track_colour),
        )
        .ratio(now_playing.progress().unwrap_or(0.0))
        .label("")
        .use_unicode(true);

    f.render_widget(position_gauge, chunks[2]);
}
