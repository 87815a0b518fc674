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

//! Tune playback control and state management.
//!
//! This module provides the high-level [`AudioPlayer`] interface used by the
//! UI to control playback. Tunes are played by an external player program
//! driven from a background worker thread, so starting and stopping a player
//! process never blocks the main application thread.

mod commands;

use std::{
    path::PathBuf,
    sync::mpsc,
    thread::JoinHandle,
    time::{Duration, Instant},
};

use anyhow::{Result, anyhow};

pub(crate) use commands::Launcher;

use crate::{events::AppEvent, player::commands::AudioPlayerCommand};

/// Represents the current playback status of the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PlayerState {
    Playing,
    Stopped,
}

/// The tune most recently sent to the player.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NowPlaying {
    /// The request id the player reports back when this song finishes.
    pub(crate) play_id: u64,
    /// Catalog position of the tune.
    pub(crate) position: usize,
    pub(crate) path: PathBuf,
    pub(crate) song: u16,
    pub(crate) length: Option<Duration>,
    started: Instant,
    ended: Option<Instant>,
}

impl NowPlaying {
    pub(crate) fn new(
        play_id: u64,
        position: usize,
        path: PathBuf,
        song: u16,
        length: Option<Duration>,
    ) -> Self {
        Self {
            play_id,
            position,
            path,
            song,
            length,
            started: Instant::now(),
            ended: None,
        }
    }

    /// Freezes the elapsed time.
    pub(crate) fn end(&mut self) {
        self.ended.get_or_insert_with(Instant::now);
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.ended
            .unwrap_or_else(Instant::now)
            .saturating_duration_since(self.started)
    }

    /// Fraction of the song length played, if the length is known.
    pub(crate) fn progress(&self) -> Option<f64> {
        let length = self.length.filter(|l| !l.is_zero())?;
        Some((self.elapsed().as_secs_f64() / length.as_secs_f64()).clamp(0.0, 1.0))
    }
}

/// A handle to the playback worker.
///
/// This struct acts as a command proxy; it does not play anything itself but
/// instead sends instructions to a background worker thread.
pub(crate) struct AudioPlayer {
    /// Channel for sending commands to the background worker thread.
    command_tx: mpsc::Sender<AudioPlayerCommand>,
    worker: Option<JoinHandle<()>>,
    last_play_id: u64,
}

impl AudioPlayer {
    /// Spawns the playback worker thread and returns a new player handle.
    ///
    /// # Arguments
    ///
    /// * `launcher` - Starts the external player for each tune.
    /// * `event_tx` - A channel to send application-level events (state
    ///   changes, finished tunes or errors) back to the main event loop.
    pub(crate) fn new(launcher: Launcher, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<AudioPlayerCommand>();

        let worker = commands::spawn_player_worker(launcher, command_rx, event_tx);

        Self {
            command_tx,
            worker: Some(worker),
            last_play_id: 0,
        }
    }

    /// Instructs the worker to play a song of a tune, replacing whatever is
    /// currently playing.
    ///
    /// Returns a new id for this request. The finished event for the song
    /// carries the same id, so a report for an earlier request can be told
    /// apart even when it is for the same song.
    ///
    /// # Arguments
    ///
    /// * `path` - The tune file on disk.
    /// * `song` - The 1-based song number.
    /// * `length` - Stop after this long, if known.
    pub(crate) fn play_tune(
        &mut self,
        path: PathBuf,
        song: u16,
        length: Option<Duration>,
    ) -> Result<u64> {
        self.last_play_id += 1;
        let play_id = self.last_play_id;

        self.command_tx.send(AudioPlayerCommand::PlayTune {
            play_id,
            path,
            song,
            length,
        })?;
        Ok(play_id)
    }

    /// Stop playback.
    pub(crate) fn stop(&self) -> Result<()> {
        self.command_tx.send(AudioPlayerCommand::Stop)?;
        Ok(())
    }

    /// Stops playback and waits for the worker thread to finish.
    ///
    /// After this returns no player process started by this handle is left
    /// running. Calling it again does nothing.
    pub(crate) fn shutdown(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        // The worker also quits if the channel is already closed
        let _ = self.command_tx.send(AudioPlayerCommand::Quit);

        worker
            .join()
            .map_err(|_| anyhow!("Player worker panicked"))
    }
}
