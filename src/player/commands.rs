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

//! External player process management.
//!
//! The worker thread owns at most one child process at a time. It receives
//! [`AudioPlayerCommand`]s from the UI and polls the running child between
//! commands, broadcasting [`AppEvent`]s when playback starts, stops or a tune
//! runs to the end.

use anyhow::{Context, Result};
use std::{
    io,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    sync::mpsc::{Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::{events::AppEvent, player::PlayerState};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub(crate) enum AudioPlayerCommand {
    PlayTune {
        /// Identifies this request in the matching finished event.
        play_id: u64,
        path: PathBuf,
        song: u16,
        length: Option<Duration>,
    },
    Stop,
    Quit,
}

/// Starts the external player program.
#[derive(Debug, Clone)]
pub(crate) struct Launcher {
    program: String,
    args: Vec<String>,
}

impl Launcher {
    pub(crate) fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The command line for playing `song` of the tune at `path`:
    /// `<program> <args> -o<song> <path>`.
    fn command(&self, path: &Path, song: u16) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(format!("-o{}", song))
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    fn spawn(&self, path: &Path, song: u16) -> io::Result<Child> {
        self.command(path, song).spawn()
    }
}

struct Playback {
    child: Child,
    play_id: u64,
    started: Instant,
    length: Option<Duration>,
}

impl Playback {
    // Whether the child has exited, or has been killed for running past the
    // song length.
    fn finished(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!("Player exited with {}", status);
                true
            }
            Ok(None) => match self.length {
                Some(length) if !length.is_zero() && self.started.elapsed() >= length => {
                    self.kill();
                    true
                }
                _ => false,
            },
            Err(e) => {
                warn!("Failed to query player process: {}", e);
                self.kill();
                true
            }
        }
    }

    fn kill(&mut self) {
        // Killing an exited child is an error we don't care about
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Spawns the playback worker thread.
///
/// If the internal worker returns an error, it is caught here and broadcast as
/// an application error event.
///
/// # Arguments
///
/// * `launcher` - Starts the external player.
/// * `command_rx` - The receiving end of the player command channel.
/// * `event_tx` - The channel used to broadcast playback updates and errors.
pub(crate) fn spawn_player_worker(
    launcher: Launcher,
    command_rx: Receiver<AudioPlayerCommand>,
    event_tx: Sender<AppEvent>,
) -> JoinHandle<()> {
    let error_tx = event_tx.clone();

    thread::spawn(move || {
        let mut current = None;

        let result = audio_player_worker(&launcher, &mut current, &command_rx, &event_tx);

        // Never leave a player running behind us
        stop_playback(&mut current);

        if let Err(e) = result {
            let _ = error_tx.send(AppEvent::Error(format!("Player worker failure: {:?}", e)));
        }
    })
}

/// The execution loop for the playback worker.
///
/// Waits up to [`POLL_INTERVAL`] for each command, then checks whether the
/// current player process has finished. Returns when a quit command arrives
/// or the command channel is closed.
///
/// # Errors
///
/// Returns an error if events can no longer be sent to the application.
fn audio_player_worker(
    launcher: &Launcher,
    current: &mut Option<Playback>,
    command_rx: &Receiver<AudioPlayerCommand>,
    event_tx: &Sender<AppEvent>,
) -> Result<()> {
    let mut player_state = PlayerState::Stopped;

    loop {
        let new_player_state = match command_rx.recv_timeout(POLL_INTERVAL) {
            Ok(AudioPlayerCommand::PlayTune {
                play_id,
                path,
                song,
                length,
            }) => {
                stop_playback(current);

                match launcher.spawn(&path, song) {
                    Ok(child) => {
                        info!("Playing {} song {}", path.display(), song);
                        *current = Some(Playback {
                            child,
                            play_id,
                            started: Instant::now(),
                            length,
                        });
                        PlayerState::Playing
                    }
                    Err(e) => {
                        warn!("Failed to start player for {}: {}", path.display(), e);
                        event_tx
                            .send(AppEvent::Error(format!("Failed to start player: {}", e)))
                            .context("Failed to send error event")?;
                        PlayerState::Stopped
                    }
                }
            }
            Ok(AudioPlayerCommand::Stop) => {
                stop_playback(current);
                PlayerState::Stopped
            }
            Ok(AudioPlayerCommand::Quit) | Err(RecvTimeoutError::Disconnected) => {
                return Ok(());
            }
            Err(RecvTimeoutError::Timeout) => {
                if current.as_mut().is_some_and(Playback::finished) {
                    if let Some(playback) = current.take() {
                        event_tx
                            .send(AppEvent::TuneFinished {
                                play_id: playback.play_id,
                            })
                            .context("Failed to send tune finished event")?;
                    }
                    PlayerState::Stopped
                } else {
                    player_state
                }
            }
        };

        if new_player_state != player_state {
            player_state = new_player_state;
            event_tx
                .send(AppEvent::PlayerStateChanged(new_player_state))
                .context("Failed to send player state event")?;
        }
    }
}

/// Kills and reaps the current player process, if any.
fn stop_playback(current: &mut Option<Playback>) {
    if let Some(mut playback) = current.take() {
        playback.kill();
    }
}

#[cfg(test)]
mod tests {
    use std::{ffi::OsStr, sync::mpsc};

    use super::*;
    use crate::player::AudioPlayer;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn next_event(event_rx: &mpsc::Receiver<AppEvent>) -> AppEvent {
        event_rx.recv_timeout(TIMEOUT).expect("no event from player worker")
    }

    #[test]
    fn test_command_line() {
        let launcher = Launcher::new("sidplayfp", vec!["-v".to_string()]);

        let command = launcher.command(Path::new("/hvsc/GAMES/A/Arkanoid.sid"), 3);

        assert_eq!(command.get_program(), "sidplayfp");
        let args: Vec<&OsStr> = command.get_args().collect();
        assert_eq!(args, ["-v", "-o3", "/hvsc/GAMES/A/Arkanoid.sid"]);
    }

    #[test]
    fn test_missing_player_reports_error() {
        let (event_tx, event_rx) = mpsc::channel();
        let mut player = AudioPlayer::new(Launcher::new("sidpick-no-such-player", vec![]), event_tx);

        player.play_tune(PathBuf::from("a.sid"), 1, None).unwrap();

        assert!(matches!(next_event(&event_rx), AppEvent::Error(_)));
        player.shutdown().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_finished_tune_is_reported() {
        let (event_tx, event_rx) = mpsc::channel();
        let mut player = AudioPlayer::new(Launcher::new("true", vec![]), event_tx);

        player.play_tune(PathBuf::from("a.sid"), 1, None).unwrap();
        let play_id = player.play_tune(PathBuf::from("a.sid"), 2, None).unwrap();

        assert!(matches!(
            next_event(&event_rx),
            AppEvent::PlayerStateChanged(PlayerState::Playing)
        ));
        match next_event(&event_rx) {
            AppEvent::TuneFinished { play_id: finished } => assert_eq!(finished, play_id),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(
            next_event(&event_rx),
            AppEvent::PlayerStateChanged(PlayerState::Stopped)
        ));
        player.shutdown().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_song_length_stops_player() {
        let (event_tx, event_rx) = mpsc::channel();
        let launcher = Launcher::new("sh", vec!["-c".to_string(), "sleep 30".to_string()]);
        let mut player = AudioPlayer::new(launcher, event_tx);

        player
            .play_tune(PathBuf::from("a.sid"), 1, Some(Duration::from_millis(200)))
            .unwrap();

        assert!(matches!(
            next_event(&event_rx),
            AppEvent::PlayerStateChanged(PlayerState::Playing)
        ));
        assert!(matches!(next_event(&event_rx), AppEvent::TuneFinished { .. }));
        player.shutdown().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_and_shutdown() {
        let (event_tx, event_rx) = mpsc::channel();
        let launcher = Launcher::new("sh", vec!["-c".to_string(), "sleep 30".to_string()]);
        let mut player = AudioPlayer::new(launcher, event_tx);

        player.play_tune(PathBuf::from("a.sid"), 1, None).unwrap();
        assert!(matches!(
            next_event(&event_rx),
            AppEvent::PlayerStateChanged(PlayerState::Playing)
        ));

        player.stop().unwrap();
        assert!(matches!(
            next_event(&event_rx),
            AppEvent::PlayerStateChanged(PlayerState::Stopped)
        ));

        player.shutdown().unwrap();
        player.shutdown().unwrap();
    }
}
