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

//! # SID Tune Picker.
//!
//! A terminal browser and player for the High Voltage SID Collection.
//!
//! At startup the tunes index is loaded from a local snapshot, downloaded if
//! there is none, or rebuilt from the collection itself on request. The
//! index is then browsed and searched in a TUI built with `ratatui`, and tunes
//! are played by an external SID player.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** manages the terminal lifecycle and UI rendering.
//! * The **Player Worker** starts and stops the external player process.
//! * **Event Loops** capture user input and system ticks to drive the UI
//!   state.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even when the event loop fails. Communication
//! between the UI and the player worker is handled via `std::sync::mpsc`
//! channels.

mod browser;
mod config;
mod error;
mod events;
mod hvsc;
mod logging;
mod model;
mod player;
mod render;
mod search_bar;
mod theme;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self},
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};
use tracing::{info, warn};

use crate::{
    browser::TuneBrowser,
    config::Settings,
    events::{AppEvent, process_events},
    hvsc::{Collection, filter::FilterEngine, releases::JsonReleaseProvider},
    model::Catalog,
    player::{AudioPlayer, Launcher, NowPlaying, PlayerState},
    search_bar::SearchBar,
    theme::Theme,
};

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Browse and play the High Voltage SID Collection.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Rebuild the tunes index from the collection instead of loading it
    #[arg(long)]
    rebuild: bool,

    /// Root directory of the collection, overriding the configured one
    #[arg(long, value_name = "DIR")]
    hvsc: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Mode {
    Browse,
    Search,
}

/// Application state.
struct App {
    pub theme: Theme,
    pub mode: Mode,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub audio_player: AudioPlayer,

    pub collection: Collection,
    pub catalog: Catalog,
    pub filter: FilterEngine,

    pub browser: TuneBrowser,
    pub search_bar: SearchBar,

    pub player_state: PlayerState,
    pub now_playing: Option<NowPlaying>,
    pub status: Option<String>,
}

impl App {
    /// Create a new instance of application state, starting the player
    /// worker.
    pub fn new(settings: &Settings, collection: Collection, catalog: Catalog) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        let launcher = Launcher::new(&settings.player_command, settings.player_args.clone());
        let audio_player = AudioPlayer::new(launcher, event_tx.clone());

        let filter = FilterEngine::new(&catalog);
        let browser = TuneBrowser::new(filter.view().len());

        Self {
            theme: Theme::default(),
            mode: Mode::Browse,
            event_tx,
            event_rx,
            audio_player,
            collection,
            catalog,
            filter,
            browser,
            search_bar: SearchBar::new(),
            player_state: PlayerState::Stopped,
            now_playing: None,
            status: None,
        }
    }
}

/// The entry point of the application.
///
/// Resolves the configuration, obtains the tunes index, manages the terminal
/// lifecycle, and returns an error if any part of the execution fails.
fn main() -> Result<()> {
    let args = Args::parse();

    let settings = config::load_config().resolve(args.hvsc)?;

    logging::init_tracing(&settings.data_dir);

    let collection = Collection::new(&settings.hvsc_base, &settings.data_dir, &settings.index_url);
    let catalog = load_catalog(&collection, &settings, args.rebuild)?;

    let mut app = App::new(&settings, collection, catalog);

    let mut terminal = setup_terminal(&app)?;
    let res = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal);

    if let Err(e) = app.audio_player.shutdown() {
        warn!("Failed to stop player: {:?}", e);
    }

    res.context("Application error occurred")
}

/// Obtains the tunes index, either rebuilding it from the collection or
/// loading (and if need be downloading) the snapshot.
fn load_catalog(collection: &Collection, settings: &Settings, rebuild: bool) -> Result<Catalog> {
    let catalog = if rebuild {
        info!("Rebuilding tunes index from {}", collection.hvsc_base().display());
        let releases = JsonReleaseProvider::in_dir(&settings.data_dir);
        collection
            .rebuild(&releases)
            .context("Failed to rebuild tunes index")?
    } else {
        collection
            .load_or_fetch()
            .context("Failed to load tunes index")?
    };

    if catalog.is_empty() {
        warn!("Tunes index for HVSC #{} is empty", catalog.release());
    } else {
        info!("Read {} tunes of HVSC #{}.", catalog.len(), catalog.release());
    }

    Ok(catalog)
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Sets the terminal background color based on the provided theme.
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Set the background of the entire terminal window, without this we'd get
    // a thin black outline
    if let Some(hex) = Theme::to_hex(app.theme.background_colour) {
        util::term::set_terminal_bg(&hex);
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`], including disabling
/// raw mode, leaving the alternate screen, and resetting the background color.
/// It also ensures the cursor is made visible again.
///
/// This function is "best-effort" and does not return a result, as it is
/// called during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    util::term::reset_terminal_bg();
    terminal.show_cursor().ok();
}

/// Starts the input and tick threads and enters the main event loop.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Spawn a thread to translate raw key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event::Event::Key(key)) => {
                    if tx_keys.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let _ = tx_keys.send(AppEvent::Error(format!("Failed to read input: {}", e)));
                    break;
                }
            }
        }
    });

    // Spawn a thread to send a periodic tick application event, this is
    // effectively the minimum "frame rate" for rendering the TUI application
    // and keeps the elapsed time moving.
    let tx_tick = app.event_tx.clone();
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    // Application event loop, process events until the user quits
    process_events(terminal, app)
}
