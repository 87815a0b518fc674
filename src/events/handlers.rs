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
use tracing::error;

use crate::{
    App,
    player::{NowPlaying, PlayerState},
};

/// Re-runs the search and moves the list back to the top.
pub(super) fn apply_filter(app: &mut App, query: &str) {
    let count = app.filter.filter(query).len();
    app.browser.reset(count);
}

pub(super) fn play_selected_tune(app: &mut App) -> Result<()> {
    let Some((position, song)) = app
        .browser
        .selected()
        .and_then(|n| app.filter.view().get(&app.catalog, n))
        .map(|tune| (tune.index, tune.header.start_song))
    else {
        return Ok(());
    };

    play_song(app, position, song)
}

/// Moves the playing tune `delta` songs forward or back, staying within the
/// songs the tune has.
pub(super) fn change_song(app: &mut App, delta: i32) -> Result<()> {
    let Some((position, current)) = app.now_playing.as_ref().map(|np| (np.position, np.song)) else {
        return Ok(());
    };
    let Some(songs) = app.catalog.get(position).map(|tune| tune.header.songs) else {
        return Ok(());
    };

    let song = i32::from(current) + delta;
    if song < 1 || song > i32::from(songs) {
        return Ok(());
    }

    play_song(app, position, song as u16)
}

fn play_song(app: &mut App, position: usize, song: u16) -> Result<()> {
    let Some(tune) = app.catalog.get(position) else {
        return Ok(());
    };

    let path = app.collection.tune_file(&tune.path);
    let length = tune.song_length(song);

    let play_id = app.audio_player.play_tune(path.clone(), song, length)?;
    app.now_playing = Some(NowPlaying::new(play_id, position, path, song, length));
    app.status = None;

    Ok(())
}

pub(super) fn stop_playback(app: &mut App) -> Result<()> {
    app.audio_player.stop()?;
    if let Some(now_playing) = app.now_playing.as_mut() {
        now_playing.end();
    }

    Ok(())
}

pub(super) fn handle_player_state_changed(app: &mut App, state: PlayerState) {
    app.player_state = state;
}

/// Ends the display of the playing tune, unless another song, or the same
/// one again, has been started since.
pub(super) fn handle_tune_finished(app: &mut App, play_id: u64) {
    if let Some(now_playing) = app.now_playing.as_mut() {
        if now_playing.play_id == play_id {
            now_playing.end();
            app.player_state = PlayerState::Stopped;
        }
    }
}

pub(super) fn handle_error(app: &mut App, message: String) {
    error!("{}", message);
    app.status = Some(message);
}
