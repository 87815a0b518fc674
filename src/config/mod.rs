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

//! Application configuration.
//!
//! This module manages the application configuration file, environment
//! overrides and the settings resolved from them at startup.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "sidpick";

const ENV_HVSC_BASE: &str = "HVSC_BASE";
const ENV_DATA_DIR: &str = "SIDPICK_DATA_DIR";

pub(crate) const DEFAULT_INDEX_URL: &str =
    "https://github.com/lhz/sidtune-index/raw/master/hvsc-{release}/tunes.json.gz";

pub(crate) const DEFAULT_PLAYER_COMMAND: &str = "sidplayfp";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) version: u32,
    pub(crate) hvsc_base: Option<PathBuf>,
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) index_url: String,
    pub(crate) player_command: String,
    pub(crate) player_args: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            hvsc_base: None,
            data_dir: None,
            index_url: DEFAULT_INDEX_URL.to_string(),
            player_command: DEFAULT_PLAYER_COMMAND.to_string(),
            player_args: vec![],
        }
    }
}

/// Configuration with every location resolved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    pub(crate) hvsc_base: PathBuf,
    pub(crate) data_dir: PathBuf,
    pub(crate) index_url: String,
    pub(crate) player_command: String,
    pub(crate) player_args: Vec<String>,
}

impl AppConfig {
    /// Applies overrides from environment variables, as returned by `lookup`.
    /// Empty values are ignored.
    pub(crate) fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name| lookup(name).filter(|value| !value.is_empty());

        if let Some(base) = var(ENV_HVSC_BASE) {
            self.hvsc_base = Some(PathBuf::from(base));
        }
        if let Some(dir) = var(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Resolves the configuration into [`Settings`].
    ///
    /// # Arguments
    ///
    /// * `hvsc_override` - A collection root given on the command line, this
    ///   takes precedence over the configured one.
    ///
    /// # Errors
    ///
    /// Returns an error if no collection root is configured, or the default
    /// data directory cannot be determined.
    pub(crate) fn resolve(self, hvsc_override: Option<PathBuf>) -> Result<Settings> {
        let Some(hvsc_base) = hvsc_override.or(self.hvsc_base) else {
            bail!(
                "No tune collection configured, set {} or use --hvsc <DIR>",
                ENV_HVSC_BASE
            );
        };

        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        Ok(Settings {
            hvsc_base,
            data_dir,
            index_url: self.index_url,
            player_command: self.player_command,
            player_args: self.player_args,
        })
    }
}

/// Loads the configuration file and applies environment overrides.
pub(crate) fn load_config() -> AppConfig {
    let mut config: AppConfig = confy::load(CONFIG_NAME, None).unwrap_or_default();
    config.apply_env(|name| std::env::var(name).ok());
    config
}

// The directory holding the configuration file.
fn default_data_dir() -> Result<PathBuf> {
    let path = confy::get_configuration_file_path(CONFIG_NAME, None)
        .context("Failed to locate configuration directory")?;

    path.parent()
        .map(PathBuf::from)
        .context("Configuration file has no parent directory")
}
