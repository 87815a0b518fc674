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

//! Diagnostic logging.
//!
//! The terminal belongs to the user interface while the application runs, so
//! log output goes to a file in the data directory instead.

use std::{fs::File, path::Path, sync::Arc};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub(crate) const LOG_FILE: &str = "sidpick.log";

/// Initialise tracing, writing to [`LOG_FILE`] under `data_dir`.
///
/// Falls back to stderr if the log file cannot be created. The filter
/// defaults to `info` and can be overridden with `RUST_LOG`.
pub(crate) fn init_tracing(data_dir: &Path) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = data_dir.join(LOG_FILE);
    let _ = std::fs::create_dir_all(data_dir);

    match File::create(&log_path) {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .init();
        }
        Err(e) => {
            eprintln!("Failed to create log file at {}: {e}", log_path.display());

            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
